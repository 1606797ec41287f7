use axum::http::StatusCode;

use crate::{config::Config, error::AppError, repos::Repos, stores::Stores};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Score and document stores.
    pub stores: Stores,
    /// Database repositories, when a database is configured.
    pub repos: Option<Repos>,
}

impl AppState {
    /// Repositories, or 503 when the service runs without a database.
    pub fn repos(&self) -> Result<&Repos, AppError> {
        self.repos.as_ref().ok_or(AppError::External(
            StatusCode::SERVICE_UNAVAILABLE,
            "User storage is not configured",
        ))
    }
}
