//! Readiness of the relational schema the user endpoints rely on.
//!
//! The service never migrates; it only checks that the `users` table is there.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepo: Send + Sync {
    /// `Ok(false)` when the database answers but has no `users` table; `Err`
    /// when it cannot be queried at all.
    async fn users_table_exists(&self) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgSchemaRepo {
    pool: Pool<Postgres>,
}

impl PgSchemaRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaRepo for PgSchemaRepo {
    async fn users_table_exists(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass('users') IS NOT NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
