//! Database repositories (PostgreSQL).
//!
//! Each repository is abstracted behind a trait to enable mocking in tests.
//! The database is optional: without `LEADERBOARD_DATABASE_URL` the service
//! runs with score endpoints only and user endpoints answer 503.
//!
//! ## Repositories
//!
//! - **users** - Sign-in by platform account and platform re-linking
//! - **schema** - Whether the `users` table exists, for health checks
//!
//! ## Usage in Handlers
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let repos = state.repos()?;
//!     let user = repos.users.find_by_platform("g-1", "google").await?;
//! }
//! ```

mod schema;
mod users;

pub use schema::{PgSchemaRepo, SchemaRepo};
pub use users::{PgUserRepo, UserRepo};

#[cfg(test)]
pub use schema::MockSchemaRepo;
#[cfg(test)]
pub use users::MockUserRepo;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub schema: Arc<dyn SchemaRepo>,
}

impl Repos {
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            schema: Arc::new(PgSchemaRepo::new(pool)),
        }
    }
}
