//! In-memory ranked counters.
//!
//! Each collection is a [`SortedSet`]: a hash index from member to its
//! [`RankKey`] and an ordered index from key back to member. Both indexes are
//! only touched together under the collection's write lock, so readers never
//! see a member whose score and position disagree.
//!
//! Members with equal scores are ordered by the sequence number they were
//! given on first insert, so whoever reached a score first ranks ahead.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::api::ScoreEntry;

use super::order_index::OrderIndex;
use super::ranking::{
    Collection, RankedCounterStore, StoreError, StoreResult, validate_delta, validate_member,
    validate_range,
};

/// Position of a member in the ordered index: score descending, then
/// first-insert sequence ascending.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    score: f64,
    seq: u64,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

/// A single ranked collection. Not synchronised; see [`MemoryRankedStore`].
#[derive(Debug, Default)]
pub struct SortedSet {
    members: HashMap<String, RankKey>,
    order: OrderIndex<RankKey, String>,
    next_seq: u64,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds `delta` to the member's score, inserting it at zero first if
    /// absent. Returns the new score.
    ///
    /// Rejects the call without touching the set if the sum would not be
    /// finite.
    pub fn increment(&mut self, member: &str, delta: f64) -> StoreResult<f64> {
        let current = self.members.get(member).copied();
        let score = current.map_or(0.0, |key| key.score) + delta;
        if !score.is_finite() {
            return Err(StoreError::InvalidInput(format!(
                "score of {member:?} would overflow"
            )));
        }

        match current {
            Some(old) => {
                let key = RankKey { score, seq: old.seq };
                let name = self.order.remove(&old).unwrap_or_else(|| member.to_owned());
                self.order.insert(key, name);
                if let Some(slot) = self.members.get_mut(member) {
                    *slot = key;
                }
            }
            None => {
                let key = RankKey {
                    score,
                    seq: self.next_seq,
                };
                self.next_seq += 1;
                self.order.insert(key, member.to_owned());
                self.members.insert(member.to_owned(), key);
            }
        }

        debug_assert_eq!(self.order.len(), self.members.len());
        Ok(score)
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.members.get(member).map(|key| key.score)
    }

    /// Zero-based position of the member, best first. Logarithmic in the
    /// size of the set.
    pub fn rank(&self, member: &str) -> Option<u64> {
        let key = self.members.get(member)?;
        Some(self.order.position(key) as u64)
    }

    /// Members at positions `start..=stop`, or through the end when `stop` is
    /// `None`.
    pub fn range(&self, start: usize, stop: Option<usize>) -> Vec<ScoreEntry> {
        let take = match stop {
            Some(stop) if stop < start => return Vec::new(),
            Some(stop) => stop - start + 1,
            None => usize::MAX,
        };

        self.order
            .iter_from(start)
            .take(take)
            .map(|(key, member)| ScoreEntry::new(member.as_str(), key.score))
            .collect()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.order.clear();
    }
}

/// Process-local implementation of [`RankedCounterStore`].
///
/// Every [`Collection`] has its own lock, so traffic on one leaderboard never
/// waits on another. Locks are never held across an await point.
pub struct MemoryRankedStore {
    collections: [RwLock<SortedSet>; Collection::COUNT],
}

impl MemoryRankedStore {
    pub fn new() -> Self {
        Self {
            collections: std::array::from_fn(|_| RwLock::new(SortedSet::new())),
        }
    }

    fn collection(&self, collection: Collection) -> &RwLock<SortedSet> {
        &self.collections[collection.index()]
    }
}

impl Default for MemoryRankedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankedCounterStore for MemoryRankedStore {
    async fn increment(&self, collection: Collection, member: &str, delta: f64) -> StoreResult<f64> {
        validate_member(member)?;
        validate_delta(delta)?;

        self.collection(collection).write().increment(member, delta)
    }

    async fn score(&self, collection: Collection, member: &str) -> StoreResult<Option<f64>> {
        validate_member(member)?;

        Ok(self.collection(collection).read().score(member))
    }

    async fn rank(&self, collection: Collection, member: &str) -> StoreResult<Option<u64>> {
        validate_member(member)?;

        Ok(self.collection(collection).read().rank(member))
    }

    async fn top_range(
        &self,
        collection: Collection,
        start: i64,
        stop: i64,
    ) -> StoreResult<Vec<ScoreEntry>> {
        let (start, stop) = validate_range(start, stop)?;

        Ok(self.collection(collection).read().range(start, stop))
    }

    async fn reset(&self, collection: Collection) -> StoreResult<()> {
        self.collection(collection).write().clear();
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
