//! Game balance document: one opaque JSON blob under a single key.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use redis::AsyncCommands;

use super::ranking::with_deadline;

const BALANCE_KEY: &str = "balance";

/// Store for the balance document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Get the stored document, or `None` if it was never set.
    async fn get(&self) -> Result<Option<String>>;

    /// Replace the stored document.
    async fn set(&self, data: &str) -> Result<()>;
}

/// Redis implementation of BalanceStore.
///
/// Shares the ranked store's deadline, so an unreachable Redis is reported as
/// [`StoreError::Unavailable`](super::StoreError::Unavailable) here too.
#[derive(Clone)]
pub struct RedisBalanceStore {
    client: redis::Client,
    timeout: Duration,
}

impl RedisBalanceStore {
    pub fn new(client: redis::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl BalanceStore for RedisBalanceStore {
    async fn get(&self) -> Result<Option<String>> {
        let data = with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let data: Option<String> = conn.get(BALANCE_KEY).await?;
            Ok::<_, redis::RedisError>(data)
        })
        .await?;
        Ok(data)
    }

    async fn set(&self, data: &str) -> Result<()> {
        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let _: () = conn.set(BALANCE_KEY, data).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await?;
        Ok(())
    }
}

/// Process-local implementation of BalanceStore.
#[derive(Default)]
pub struct MemoryBalanceStore {
    data: RwLock<Option<String>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.data.read().clone())
    }

    async fn set(&self, data: &str) -> Result<()> {
        *self.data.write() = Some(data.to_owned());
        Ok(())
    }
}
