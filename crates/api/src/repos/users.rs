//! User repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::User;

/// Repository for user identity and platform links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find the user linked to a platform account.
    async fn find_by_platform(&self, platform_id: &str, platform: &str) -> Result<Option<User>>;

    /// Create a new user linked to a platform account.
    async fn create(&self, platform_id: &str, platform: &str, device_id: &str) -> Result<User>;

    /// Re-link a user to another platform account. Only matches when the
    /// device id is the one the user signed up from. Returns true if a row changed.
    async fn change_platform(
        &self,
        id: i64,
        device_id: &str,
        platform_id: &str,
        platform: &str,
    ) -> Result<bool>;
}

/// PostgreSQL implementation of UserRepo.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: Pool<Postgres>,
}

impl PgUserRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_platform(&self, platform_id: &str, platform: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, platform_id, platform, device_id FROM users WHERE platform_id = $1 AND platform = $2",
        )
        .bind(platform_id)
        .bind(platform)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, platform_id: &str, platform: &str, device_id: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (platform_id, platform, device_id) VALUES ($1, $2, $3) \
             RETURNING id, platform_id, platform, device_id",
        )
        .bind(platform_id)
        .bind(platform)
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn change_platform(
        &self,
        id: i64,
        device_id: &str,
        platform_id: &str,
        platform: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET platform_id = $1, platform = $2 WHERE id = $3 AND device_id = $4",
        )
        .bind(platform_id)
        .bind(platform)
        .bind(id)
        .bind(device_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
