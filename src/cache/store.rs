//! Cache Store Interface
//!
//! Expected absence and backend failure are modeled as explicit result
//! variants, not errors: callers treat both as a miss and repopulate.

use async_trait::async_trait;
use std::time::Duration;

use crate::cache::key::CacheKey;

/// Outcome of a cache read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheLookup {
    /// Entry present and unexpired.
    Hit(String),
    /// No entry, or the entry's TTL elapsed.
    Miss,
    /// Backend unreachable or faulty. Treated as a miss by callers.
    Degraded,
}

impl CacheLookup {
    /// Collapse to an option, degraded counts as absent.
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::Degraded => None,
        }
    }
}

/// Outcome of a cache write or invalidation.
///
/// Writes are fire-and-forget: a `Degraded` outcome must not fail the
/// operation that triggered the write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheWrite {
    Stored,
    Degraded,
}

/// Key/value store with per-key TTL.
///
/// Implementations must be safe for concurrent use; operations are
/// independent per-key reads/writes with no cross-key coordination and no
/// read-modify-write contract.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value. Never fails: backend trouble reports `Degraded`.
    async fn get(&self, key: &CacheKey) -> CacheLookup;

    /// Write a value with a TTL.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheWrite;

    /// Drop an entry before its TTL elapses.
    async fn remove(&self, key: &CacheKey) -> CacheWrite;
}

/// Store for running without a cache backend: always misses, accepts and
/// discards writes.
#[derive(Debug, Default)]
pub struct NoopCacheStore;

impl NoopCacheStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NoopCacheStore {
    async fn get(&self, _key: &CacheKey) -> CacheLookup {
        CacheLookup::Miss
    }

    async fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> CacheWrite {
        CacheWrite::Stored
    }

    async fn remove(&self, _key: &CacheKey) -> CacheWrite {
        CacheWrite::Stored
    }
}

/// Store simulating a dead backend: every operation reports `Degraded`.
#[derive(Debug, Default)]
pub struct DegradedCacheStore;

impl DegradedCacheStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for DegradedCacheStore {
    async fn get(&self, _key: &CacheKey) -> CacheLookup {
        CacheLookup::Degraded
    }

    async fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> CacheWrite {
        CacheWrite::Degraded
    }

    async fn remove(&self, _key: &CacheKey) -> CacheWrite {
        CacheWrite::Degraded
    }
}
