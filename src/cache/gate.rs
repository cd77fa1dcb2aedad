//! Degraded-Backend Gate
//!
//! Wraps a store so that after the backend reports a fault, subsequent calls
//! short-circuit to `Degraded` for a cooldown interval instead of
//! re-attempting a dead connection on every operation. One probe per
//! cooldown window re-checks the backend.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::cache::key::CacheKey;
use crate::cache::store::{CacheLookup, CacheStore, CacheWrite};

/// Cooldown gate around a cache store.
pub struct DegradeGate<S: CacheStore> {
    inner: S,
    cooldown: Duration,
    tripped_at: Mutex<Option<Instant>>,
}

impl<S: CacheStore> DegradeGate<S> {
    pub fn new(inner: S, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            tripped_at: Mutex::new(None),
        }
    }

    /// Check whether the gate is currently short-circuiting.
    pub fn is_tripped(&self) -> bool {
        self.tripped_at
            .lock()
            .ok()
            .and_then(|guard| *guard)
            .map(|at| at.elapsed() < self.cooldown)
            .unwrap_or(false)
    }

    fn trip(&self) {
        if let Ok(mut guard) = self.tripped_at.lock() {
            if guard.is_none() {
                warn!(cooldown = ?self.cooldown, "cache backend degraded, short-circuiting");
            }
            *guard = Some(Instant::now());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.tripped_at.lock() {
            if guard.take().is_some() {
                debug!("cache backend recovered");
            }
        }
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for DegradeGate<S> {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        if self.is_tripped() {
            return CacheLookup::Degraded;
        }
        match self.inner.get(key).await {
            CacheLookup::Degraded => {
                self.trip();
                CacheLookup::Degraded
            }
            healthy => {
                self.clear();
                healthy
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheWrite {
        if self.is_tripped() {
            return CacheWrite::Degraded;
        }
        match self.inner.set(key, value, ttl).await {
            CacheWrite::Degraded => {
                self.trip();
                CacheWrite::Degraded
            }
            stored => {
                self.clear();
                stored
            }
        }
    }

    async fn remove(&self, key: &CacheKey) -> CacheWrite {
        if self.is_tripped() {
            return CacheWrite::Degraded;
        }
        match self.inner.remove(key).await {
            CacheWrite::Degraded => {
                self.trip();
                CacheWrite::Degraded
            }
            removed => {
                self.clear();
                removed
            }
        }
    }
}
