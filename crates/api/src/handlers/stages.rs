//! Stage attempt and clear counters.
//!
//! Every stage has two counters kept in separate ranked collections, so the
//! most attempted and most cleared stages can be listed directly.
//!
//! Endpoints:
//! - POST /stage/start - Count one attempt of a stage
//! - POST /stage/clear - Count one clear of a stage
//! - POST /stage/get - Attempt and clear counts of one stage (zero if never played)
//! - POST /stage/get/startall - All stages by attempts, highest first
//! - POST /stage/get/clearall - All stages by clears, highest first
//! - POST /stage/get/all - Both listings
//! - POST /stage/del - Reset all stage counters

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use garde::Validate;
use shared::api::{AllStagesResponse, ScoreEntry, StageInfo, StagePayload};

use crate::{
    error::AppError,
    extract::AppJson,
    state::AppState,
    stores::{Collection, RankedCounterStore},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(record_attempt))
        .route("/clear", post(record_clear))
        .route("/get", post(get_stage))
        .route("/get/startall", post(list_attempts))
        .route("/get/clearall", post(list_clears))
        .route("/get/all", post(list_all))
        .route("/del", post(reset_stages))
}

async fn list(
    store: &dyn RankedCounterStore,
    collection: Collection,
) -> Result<Vec<ScoreEntry>, AppError> {
    Ok(store.top_range(collection, 0, -1).await?)
}

#[debug_handler]
async fn record_attempt(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let attempts = state
        .stores
        .ranking
        .increment(Collection::StageTry, &payload.id.to_string(), 1.0)
        .await?;

    tracing::info!(stage_id = payload.id, attempts, "stage attempt recorded");

    Ok(Json(true))
}

#[debug_handler]
async fn record_clear(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let clears = state
        .stores
        .ranking
        .increment(Collection::StageClear, &payload.id.to_string(), 1.0)
        .await?;

    tracing::info!(stage_id = payload.id, clears, "stage clear recorded");

    Ok(Json(true))
}

/// A stage nobody has played yet reports zero for both counters.
#[debug_handler]
async fn get_stage(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = payload.id.to_string();
    let ranking = &state.stores.ranking;
    let try_cnt = ranking.score(Collection::StageTry, &member).await?;
    let clear_cnt = ranking.score(Collection::StageClear, &member).await?;

    Ok(Json(StageInfo {
        id: payload.id,
        try_cnt: try_cnt.unwrap_or_default(),
        clear_cnt: clear_cnt.unwrap_or_default(),
    }))
}

#[debug_handler]
async fn list_attempts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stages = list(state.stores.ranking.as_ref(), Collection::StageTry).await?;
    Ok(Json(stages))
}

#[debug_handler]
async fn list_clears(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stages = list(state.stores.ranking.as_ref(), Collection::StageClear).await?;
    Ok(Json(stages))
}

#[debug_handler]
async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let ranking = state.stores.ranking.as_ref();

    Ok(Json(AllStagesResponse {
        start: list(ranking, Collection::StageTry).await?,
        clear: list(ranking, Collection::StageClear).await?,
    }))
}

/// Each counter is reset on its own; a request landing between the two
/// resets sees cleared attempts next to old clears.
#[debug_handler]
async fn reset_stages(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let ranking = &state.stores.ranking;
    ranking.reset(Collection::StageTry).await?;
    ranking.reset(Collection::StageClear).await?;

    tracing::info!("stage counters reset");

    Ok(Json(true))
}
