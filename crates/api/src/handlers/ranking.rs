//! User leaderboard.
//!
//! Clients submit score deltas; the server keeps the cumulative score per user
//! and answers with the user's current position.
//!
//! Endpoints:
//! - POST /incrscore - Add a delta to a user's score, return score and rank
//! - POST /getleaderboard - Top of the leaderboard

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use garde::Validate;
use shared::api::{IncrScorePayload, RankResponse};

use crate::{error::AppError, extract::AppJson, state::AppState, stores::Collection};

/// Last position included in the leaderboard listing (501 entries).
const LEADERBOARD_LAST: i64 = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/incrscore", post(incr_score))
        .route("/getleaderboard", post(get_leaderboard))
}

#[debug_handler]
async fn incr_score(
    State(state): State<AppState>,
    AppJson(payload): AppJson<IncrScorePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = payload.id.to_string();
    let ranking = &state.stores.ranking;
    let score = ranking
        .increment(Collection::Rank, &member, payload.score)
        .await?;
    // A reset between the two calls removes the member again.
    let rank = ranking
        .rank(Collection::Rank, &member)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {member} vanished from leaderboard after increment"))?;

    tracing::info!(user_id = payload.id, delta = payload.score, score, rank, "score submitted");

    Ok(Json(RankResponse {
        id: payload.id,
        score,
        rank,
    }))
}

#[debug_handler]
async fn get_leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let ranks = state
        .stores
        .ranking
        .top_range(Collection::Rank, 0, LEADERBOARD_LAST)
        .await?;

    tracing::debug!(entries = ranks.len(), "leaderboard fetched");

    Ok(Json(ranks))
}
