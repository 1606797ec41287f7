//! Player accounts linked to a platform login.
//!
//! A user is identified by a numeric game id. The first sign-in from a
//! platform account creates the user; later sign-ins return the same id.
//!
//! Endpoints:
//! - POST /login - Sign in or sign up, returns the game id
//! - POST /changeplatform - Link the user to another platform account
//!   (also served as /changeplatfrom, the path shipped game clients call)

use axum::{
    Json, Router, debug_handler, extract::State, http::StatusCode, response::IntoResponse,
    routing::post,
};
use garde::Validate;
use shared::api::{ChangePlatformPayload, LoginPayload, UserResponse};

use crate::{error::AppError, extract::AppJson, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/changeplatform", post(change_platform))
        .route("/changeplatfrom", post(change_platform))
}

#[debug_handler]
async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let users = &state.repos()?.users;

    let user = match users
        .find_by_platform(&payload.platform_id, &payload.platform)
        .await?
    {
        Some(user) => user,
        None => {
            let user = users
                .create(&payload.platform_id, &payload.platform, &payload.device_id)
                .await?;
            tracing::info!(user_id = user.id, platform = %user.platform, "user signed up");
            user
        }
    };

    Ok(Json(UserResponse::from(user)))
}

/// Only the device the user signed up from may move the account.
#[debug_handler]
async fn change_platform(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePlatformPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = state
        .repos()?
        .users
        .change_platform(
            payload.id,
            &payload.device_id,
            &payload.platform_id,
            &payload.platform,
        )
        .await?;

    if !updated {
        return Err(AppError::External(StatusCode::NOT_FOUND, "User not found"));
    }

    tracing::info!(user_id = payload.id, platform = %payload.platform, "platform changed");

    Ok(Json(UserResponse {
        id: payload.id,
        platform_id: payload.platform_id,
        platform: payload.platform,
        device_id: payload.device_id,
    }))
}
