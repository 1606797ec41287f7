//! Shared test utilities for API handler tests.
//!
//! Provides mock factories and a `TestStateBuilder` for constructing
//! `AppState` instances with only the mocks needed for each test.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, mock_user};
//!
//! let mut user_repo = MockUserRepo::new();
//! user_repo.expect_find_by_platform().returning(|_, _| Ok(Some(mock_user(1))));
//!
//! let state = TestStateBuilder::new()
//!     .with_user_repo(user_repo)
//!     .build();
//! ```
//!
//! Handlers that only need working stores can use `with_memory_stores()` and
//! exercise the real in-process implementations.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use crate::config::{Config, StoreBackend};
use crate::models::User;
use crate::repos::{MockSchemaRepo, MockUserRepo, Repos};
use crate::state::AppState;
use crate::stores::{
    BalanceStore, MemoryBalanceStore, MemoryRankedStore, MockBalanceStore,
    MockRankedCounterStore, RankedCounterStore, Stores,
};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8888,
        store: StoreBackend::Memory,
        redis_url: None,
        redis_timeout_ms: 2000,
        database_url: Some("postgres://test".to_string()),
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Creates a mock user with the given id.
pub fn mock_user(id: i64) -> User {
    User {
        id,
        platform_id: "g-123".to_string(),
        platform: "google".to_string(),
        device_id: "device-1".to_string(),
    }
}

/// Reads a response body as JSON.
pub async fn response_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends a JSON POST through a router, exercising routing and extraction.
pub async fn post_json(
    router: Router<AppState>,
    state: AppState,
    uri: &str,
    body: &str,
) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();

    router.with_state(state).oneshot(request).await.unwrap()
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Uses default (empty) mocks for any repo/store not explicitly set, so a
/// test panics if a handler touches something it did not expect.
pub struct TestStateBuilder {
    ranking_store: Option<Arc<dyn RankedCounterStore>>,
    balance_store: Option<Arc<dyn BalanceStore>>,
    user_repo: Option<MockUserRepo>,
    schema_repo: Option<MockSchemaRepo>,
    database: bool,
}

impl TestStateBuilder {
    /// Creates a new builder with no mocks configured.
    pub fn new() -> Self {
        Self {
            ranking_store: None,
            balance_store: None,
            user_repo: None,
            schema_repo: None,
            database: true,
        }
    }

    /// Uses the real in-process stores instead of mocks.
    pub fn with_memory_stores(mut self) -> Self {
        self.ranking_store = Some(Arc::new(MemoryRankedStore::new()));
        self.balance_store = Some(Arc::new(MemoryBalanceStore::new()));
        self
    }

    pub fn with_ranking_store(mut self, store: MockRankedCounterStore) -> Self {
        self.ranking_store = Some(Arc::new(store));
        self
    }

    pub fn with_balance_store(mut self, store: MockBalanceStore) -> Self {
        self.balance_store = Some(Arc::new(store));
        self
    }

    pub fn with_user_repo(mut self, repo: MockUserRepo) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn with_schema_repo(mut self, repo: MockSchemaRepo) -> Self {
        self.schema_repo = Some(repo);
        self
    }

    /// Builds state as if `LEADERBOARD_DATABASE_URL` were unset.
    pub fn without_database(mut self) -> Self {
        self.database = false;
        self
    }

    /// Builds the `AppState` using configured mocks or defaults.
    pub fn build(self) -> AppState {
        let stores = Stores {
            ranking: self
                .ranking_store
                .unwrap_or_else(|| Arc::new(MockRankedCounterStore::new())),
            balance: self
                .balance_store
                .unwrap_or_else(|| Arc::new(MockBalanceStore::new())),
        };

        let repos = self.database.then(|| Repos {
            users: Arc::new(self.user_repo.unwrap_or_else(MockUserRepo::new)),
            schema: Arc::new(self.schema_repo.unwrap_or_else(MockSchemaRepo::new)),
        });

        let mut config = test_config();
        if repos.is_none() {
            config.database_url = None;
        }

        AppState {
            config,
            stores,
            repos,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
