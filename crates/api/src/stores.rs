//! Score and document stores.
//!
//! Each store is a trait with an in-process implementation (the default) and a
//! Redis implementation, selected at startup by `LEADERBOARD_STORE`.
//!
//! ## Stores
//!
//! - **ranking** - Ranked counters for stage attempts, stage clears and the
//!   user leaderboard
//! - **balance** - The game balance document (single opaque JSON blob)
//!
//! ## Redis Key Patterns
//!
//! ```text
//! stage:try    → Sorted set, member = stage id, score = attempts
//! stage:clear  → Sorted set, member = stage id, score = clears
//! rank         → Sorted set, member = user id, score = cumulative score
//! balance      → Balance JSON document
//! ```
//!
//! ## Usage in Handlers
//!
//! Stores are accessed via `state.stores`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let score = state.stores.ranking.increment(Collection::Rank, "7", 10.0).await?;
//!     let rank = state.stores.ranking.rank(Collection::Rank, "7").await?;
//! }
//! ```

mod balance;
mod order_index;
mod ranking;
mod sorted_set;

pub use balance::{BalanceStore, MemoryBalanceStore, RedisBalanceStore};
pub use ranking::{Collection, RankedCounterStore, RedisRankedStore, StoreError};
pub use sorted_set::MemoryRankedStore;

#[cfg(test)]
pub use balance::MockBalanceStore;
#[cfg(test)]
pub use ranking::MockRankedCounterStore;

use std::sync::Arc;

/// Collection of all stores.
#[derive(Clone)]
pub struct Stores {
    pub ranking: Arc<dyn RankedCounterStore>,
    pub balance: Arc<dyn BalanceStore>,
}

impl Stores {
    /// In-process stores. State lives as long as the process.
    pub fn memory() -> Self {
        Self {
            ranking: Arc::new(MemoryRankedStore::new()),
            balance: Arc::new(MemoryBalanceStore::new()),
        }
    }

    /// Redis-backed stores sharing one client.
    pub fn redis(client: redis::Client, timeout: std::time::Duration) -> Self {
        Self {
            ranking: Arc::new(RedisRankedStore::new(client.clone(), timeout)),
            balance: Arc::new(RedisBalanceStore::new(client, timeout)),
        }
    }
}
