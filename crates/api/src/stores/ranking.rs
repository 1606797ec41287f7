//! Ranked counters: cumulative scores per member, ordered best first.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use shared::api::ScoreEntry;

/// The ranked collections the service keeps. Key strings match the Redis
/// keys, so both backends address the same data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Attempts per stage.
    StageTry,
    /// Clears per stage.
    StageClear,
    /// Cumulative score per user.
    Rank,
}

impl Collection {
    pub const COUNT: usize = 3;

    pub fn key(self) -> &'static str {
        match self {
            Collection::StageTry => "stage:try",
            Collection::StageClear => "stage:clear",
            Collection::Rank => "rank",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Collection::StageTry => 0,
            Collection::StageClear => 1,
            Collection::Rank => 2,
        }
    }
}

/// Failures a ranked store can report. A missing member is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Rejected before anything was changed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The backing service could not be reached in time. Safe to retry.
    #[error("ranked store unavailable")]
    Unavailable(#[source] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store of cumulative scores with rank queries.
///
/// Ranges are addressed by zero-based inclusive positions; `stop = -1` reads
/// through the last member.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankedCounterStore: Send + Sync {
    /// Add `delta` to a member's score, creating it at zero. Returns the new score.
    async fn increment(&self, collection: Collection, member: &str, delta: f64)
    -> StoreResult<f64>;

    /// Current score, or `None` if the member has never been incremented.
    async fn score(&self, collection: Collection, member: &str) -> StoreResult<Option<f64>>;

    /// Zero-based position, best first, or `None` for an unknown member.
    async fn rank(&self, collection: Collection, member: &str) -> StoreResult<Option<u64>>;

    /// Members at positions `start..=stop`, best first.
    async fn top_range(
        &self,
        collection: Collection,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<ScoreEntry>>;

    /// Remove every member of the collection.
    async fn reset(&self, collection: Collection) -> StoreResult<()>;

    /// Health check - verify the store answers.
    async fn ping(&self) -> StoreResult<()>;
}

pub(crate) fn validate_member(member: &str) -> StoreResult<()> {
    if member.is_empty() {
        return Err(StoreError::InvalidInput("member must not be empty".into()));
    }
    Ok(())
}

pub(crate) fn validate_delta(delta: f64) -> StoreResult<()> {
    if !delta.is_finite() {
        return Err(StoreError::InvalidInput(format!(
            "delta must be finite, got {delta}"
        )));
    }
    Ok(())
}

/// Checks range bounds and converts them to positions. `None` means "to the end".
pub(crate) fn validate_range(start: i64, stop: i64) -> StoreResult<(usize, Option<usize>)> {
    let start = usize::try_from(start)
        .map_err(|_| StoreError::InvalidInput(format!("range start {start} is negative")))?;
    let stop = match stop {
        -1 => None,
        stop => Some(usize::try_from(stop).map_err(|_| {
            StoreError::InvalidInput(format!("range stop {stop} must be -1 or a position"))
        })?),
    };
    Ok((start, stop))
}

/// Runs a Redis call under `timeout`. Connection failures, command errors and
/// the deadline itself all surface as [`StoreError::Unavailable`].
pub(crate) async fn with_deadline<T, F>(timeout: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(StoreError::Unavailable(err.into())),
        Err(_) => Err(StoreError::Unavailable(anyhow::anyhow!(
            "redis call timed out after {timeout:?}"
        ))),
    }
}

/// Redis implementation of RankedCounterStore (sorted sets).
///
/// Every call runs under `timeout`; a call that does not finish in time, or
/// cannot connect, is reported as [`StoreError::Unavailable`]. Redis orders
/// equal scores by member name rather than by first insert.
#[derive(Clone)]
pub struct RedisRankedStore {
    client: redis::Client,
    timeout: Duration,
}

impl RedisRankedStore {
    pub fn new(client: redis::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl RankedCounterStore for RedisRankedStore {
    async fn increment(&self, collection: Collection, member: &str, delta: f64) -> StoreResult<f64> {
        validate_member(member)?;
        validate_delta(delta)?;

        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let score: f64 = conn.zincr(collection.key(), member, delta).await?;
            Ok::<_, redis::RedisError>(score)
        })
        .await
    }

    async fn score(&self, collection: Collection, member: &str) -> StoreResult<Option<f64>> {
        validate_member(member)?;

        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let score: Option<f64> = conn.zscore(collection.key(), member).await?;
            Ok::<_, redis::RedisError>(score)
        })
        .await
    }

    async fn rank(&self, collection: Collection, member: &str) -> StoreResult<Option<u64>> {
        validate_member(member)?;

        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let rank: Option<u64> = conn.zrevrank(collection.key(), member).await?;
            Ok::<_, redis::RedisError>(rank)
        })
        .await
    }

    async fn top_range(
        &self,
        collection: Collection,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<ScoreEntry>> {
        let (first, last) = validate_range(start, stop)?;
        if last.is_some_and(|last| last < first) {
            return Ok(Vec::new());
        }

        let pairs = with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let pairs: Vec<(String, f64)> = conn
                .zrevrange_withscores(collection.key(), start as isize, stop as isize)
                .await?;
            Ok::<_, redis::RedisError>(pairs)
        })
        .await?;

        Ok(pairs
            .into_iter()
            .map(|(member, score)| ScoreEntry::new(member, score))
            .collect())
    }

    async fn reset(&self, collection: Collection) -> StoreResult<()> {
        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let _: () = conn.del(collection.key()).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        with_deadline(self.timeout, async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTIONS: [Collection; Collection::COUNT] =
        [Collection::StageTry, Collection::StageClear, Collection::Rank];

    #[test]
    fn collection_keys_match_redis_names() {
        let keys: Vec<_> = COLLECTIONS.iter().map(|c| c.key()).collect();
        assert_eq!(keys, ["stage:try", "stage:clear", "rank"]);
    }

    #[test]
    fn collection_indexes_are_dense() {
        for (i, collection) in COLLECTIONS.iter().enumerate() {
            assert_eq!(collection.index(), i);
        }
    }

    #[test]
    fn range_to_end() {
        assert_eq!(validate_range(0, -1).unwrap(), (0, None));
        assert_eq!(validate_range(0, 500).unwrap(), (0, Some(500)));
    }

    #[test]
    fn range_rejects_negative_start_and_other_negative_stops() {
        assert!(matches!(validate_range(-1, 3), Err(StoreError::InvalidInput(_))));
        assert!(matches!(validate_range(0, -5), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn empty_member_rejected() {
        assert!(validate_member("").is_err());
        assert!(validate_member("42").is_ok());
    }

    #[test]
    fn non_finite_delta_rejected() {
        assert!(validate_delta(f64::NAN).is_err());
        assert!(validate_delta(f64::INFINITY).is_err());
        assert!(validate_delta(-0.5).is_ok());
    }

    #[tokio::test]
    async fn unreachable_redis_is_unavailable() {
        // Nothing listens on the discard port.
        let client = redis::Client::open("redis://127.0.0.1:9/").unwrap();
        let store = RedisRankedStore::new(client, Duration::from_millis(200));

        let result = store.score(Collection::Rank, "1").await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn deadline_expiry_is_unavailable() {
        let result: StoreResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, redis::RedisError>(())
        })
        .await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn invalid_input_checked_before_connecting() {
        let client = redis::Client::open("redis://127.0.0.1:9/").unwrap();
        let store = RedisRankedStore::new(client, Duration::from_millis(200));

        let result = store.increment(Collection::Rank, "1", f64::NAN).await;

        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }
}
