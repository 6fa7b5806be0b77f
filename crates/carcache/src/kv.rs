//! In-process cache keyspace
//!
//! A small Redis-shaped store: string keys holding opaque byte blobs,
//! plus sorted sets queryable by rank range. One `CacheConn` is built
//! at startup and cloned everywhere a handle is needed; clones share
//! the same keyspace.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ahash::RandomState;
use parking_lot::RwLock;

/// Rank-range traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Lowest score first
    Ascending,
    /// Highest score first
    Descending,
}

/// Sorted set: unique members ranked by `(score, member bytes)`
///
/// Re-adding an existing member replaces its score. Ties between
/// equal scores break on raw member bytes, reversed for descending
/// traversal.
#[derive(Debug, Default)]
struct SortedSet {
    ranked: BTreeSet<(i64, Vec<u8>)>,
    score_of: HashMap<Vec<u8>, i64, RandomState>,
}

impl SortedSet {
    fn add(&mut self, score: i64, member: Vec<u8>) {
        if let Some(old) = self.score_of.insert(member.clone(), score) {
            self.ranked.remove(&(old, member.clone()));
        }
        self.ranked.insert((score, member));
    }

    fn len(&self) -> usize {
        self.ranked.len()
    }

    fn range_by_rank(&self, start: i64, stop: i64, order: Order) -> Vec<(Vec<u8>, i64)> {
        let len = self.ranked.len() as i64;
        let resolve = |rank: i64| if rank < 0 { len + rank } else { rank };

        let start = resolve(start).max(0);
        let stop = resolve(stop).min(len - 1);
        if start > stop || start >= len {
            return Vec::new();
        }

        let take = (stop - start + 1) as usize;
        let picked: Vec<(Vec<u8>, i64)> = match order {
            Order::Ascending => self
                .ranked
                .iter()
                .skip(start as usize)
                .take(take)
                .map(|(score, member)| (member.clone(), *score))
                .collect(),
            Order::Descending => self
                .ranked
                .iter()
                .rev()
                .skip(start as usize)
                .take(take)
                .map(|(score, member)| (member.clone(), *score))
                .collect(),
        };
        picked
    }
}

/// Keyspace contents, one namespace per value kind
#[derive(Debug, Default)]
struct Keyspace {
    blobs: HashMap<String, Vec<u8>, RandomState>,
    sets: HashMap<String, SortedSet, RandomState>,
}

/// Shared handle to the cache keyspace
///
/// Construct once, clone freely: all clones point at the same data.
#[derive(Debug, Clone, Default)]
pub struct CacheConn {
    inner: Arc<RwLock<Keyspace>>,
}

impl CacheConn {
    /// Create an empty keyspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the blob stored under `key`, if any
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().blobs.get(key).cloned()
    }

    /// Store a blob under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: Vec<u8>) {
        self.inner.write().blobs.insert(key.to_string(), value);
    }

    /// Add a member to the sorted set under `key`
    ///
    /// Creates the set if absent; replaces the member's score if the
    /// member already exists.
    pub fn zadd(&self, key: &str, score: i64, member: Vec<u8>) {
        self.inner
            .write()
            .sets
            .entry(key.to_string())
            .or_default()
            .add(score, member);
    }

    /// Number of members in the sorted set under `key`
    pub fn zcard(&self, key: &str) -> usize {
        self.inner.read().sets.get(key).map_or(0, SortedSet::len)
    }

    /// Query the sorted set under `key` by rank range
    ///
    /// Ranks are zero-based and inclusive on both ends; negative
    /// ranks count back from the last member, so `(0, -1)` spans the
    /// whole set. A missing key yields an empty vector.
    pub fn zrange_by_rank(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Vec<(Vec<u8>, i64)> {
        self.inner
            .read()
            .sets
            .get(key)
            .map_or_else(Vec::new, |set| set.range_by_rank(start, stop, order))
    }

    /// Delete a key of either kind
    ///
    /// Returns whether anything existed under `key`. Safe to call on
    /// an absent key.
    pub fn del(&self, key: &str) -> bool {
        let mut keyspace = self.inner.write();
        let had_blob = keyspace.blobs.remove(key).is_some();
        let had_set = keyspace.sets.remove(key).is_some();
        had_blob || had_set
    }
}
