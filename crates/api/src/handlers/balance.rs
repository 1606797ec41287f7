//! Game balance document.
//!
//! The game's tuning table is stored as one opaque JSON document. The server
//! checks that it parses but never looks inside.
//!
//! Endpoints:
//! - POST /balance/set - Replace the document
//! - POST /balance/get - Current document, `{}` if none was set

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use garde::Validate;
use shared::api::SetBalancePayload;

use crate::{error::AppError, extract::AppJson, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set", post(set_balance))
        .route("/get", post(get_balance))
}

#[debug_handler]
async fn set_balance(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetBalancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    serde_json::from_str::<serde_json::Value>(&payload.data)
        .map_err(|e| AppError::Validation(format!("data: {e}")))?;

    state.stores.balance.set(&payload.data).await?;

    tracing::info!(bytes = payload.data.len(), "balance updated");

    Ok(Json(true))
}

#[debug_handler]
async fn get_balance(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let document = match state.stores.balance.get().await? {
        Some(data) => serde_json::from_str(&data)?,
        None => serde_json::json!({}),
    };

    Ok(Json(document))
}
