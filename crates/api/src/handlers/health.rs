//! Liveness and health endpoints for load balancers and monitoring.
//!
//! `/ping` always answers. `/health` returns 200 OK if the ranked store
//! answers and, when a database is configured, it holds the `users` table;
//! 503 Service Unavailable otherwise.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use shared::api::PingResponse;

use crate::{config::StoreBackend, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check))
}

async fn ping() -> impl IntoResponse {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum DatabaseStatus {
    Ready,
    MissingUsersTable,
    Unreachable,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: StoreBackend,
    store: bool,
    /// `None` when the service runs without a database.
    database: Option<DatabaseStatus>,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.stores.ranking.ping().await.is_ok();

    let database = match &state.repos {
        Some(repos) => Some(match repos.schema.users_table_exists().await {
            Ok(true) => DatabaseStatus::Ready,
            Ok(false) => {
                tracing::warn!("database has no users table");
                DatabaseStatus::MissingUsersTable
            }
            Err(err) => {
                tracing::warn!("database unreachable: {:?}", err);
                DatabaseStatus::Unreachable
            }
        }),
        None => None,
    };

    let healthy = store_ok && database.is_none_or(|db| db == DatabaseStatus::Ready);

    let response = HealthResponse {
        status: if healthy { "ok" } else { "unhealthy" },
        backend: state.config.store,
        store: store_ok,
        database,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::MockSchemaRepo;
    use crate::stores::{MockRankedCounterStore, StoreError};
    use crate::test_utils::{TestStateBuilder, response_json};

    #[tokio::test]
    async fn ping_answers_pong() {
        let body: PingResponse = response_json(ping().await.into_response()).await;

        assert_eq!(body.message, "pong");
    }

    async fn health_with_schema(schema: MockSchemaRepo) -> (StatusCode, serde_json::Value) {
        let state = TestStateBuilder::new()
            .with_memory_stores()
            .with_schema_repo(schema)
            .build();

        let response = health_check(State(state)).await.into_response();
        let status = response.status();
        (status, response_json(response).await)
    }

    #[tokio::test]
    async fn healthy_when_store_answers_and_users_table_exists() {
        let mut schema = MockSchemaRepo::new();
        schema.expect_users_table_exists().times(1).returning(|| Ok(true));

        let (status, body) = health_with_schema(schema).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ready");
    }

    #[tokio::test]
    async fn unhealthy_when_users_table_missing() {
        let mut schema = MockSchemaRepo::new();
        schema.expect_users_table_exists().returning(|| Ok(false));

        let (status, body) = health_with_schema(schema).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["database"], "missing_users_table");
        assert_eq!(body["store"], true);
    }

    #[tokio::test]
    async fn unhealthy_when_database_unreachable() {
        let mut schema = MockSchemaRepo::new();
        schema
            .expect_users_table_exists()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let (status, body) = health_with_schema(schema).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["database"], "unreachable");
    }

    #[tokio::test]
    async fn healthy_without_database() {
        let state = TestStateBuilder::new()
            .with_memory_stores()
            .without_database()
            .build();

        let response = health_check(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_json(response).await;
        assert_eq!(body["database"], serde_json::Value::Null);
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn unhealthy_when_store_unreachable() {
        let mut ranking = MockRankedCounterStore::new();
        ranking
            .expect_ping()
            .returning(|| Err(StoreError::Unavailable(anyhow::anyhow!("connection refused"))));

        let state = TestStateBuilder::new()
            .with_ranking_store(ranking)
            .without_database()
            .build();

        let response = health_check(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
