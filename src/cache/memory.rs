//! In-Memory Cache Store
//!
//! Process-local TTL store. Expired entries are dropped lazily on read.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::cache::key::CacheKey;
use crate::cache::store::{CacheLookup, CacheStore, CacheWrite};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache store with per-key TTL.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> CacheLookup {
        let Ok(mut entries) = self.entries.lock() else {
            return CacheLookup::Degraded;
        };
        match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > Instant::now() => {
                CacheLookup::Hit(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key.as_str());
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheWrite {
        let Ok(mut entries) = self.entries.lock() else {
            return CacheWrite::Degraded;
        };
        entries.insert(
            key.as_str().to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        CacheWrite::Stored
    }

    async fn remove(&self, key: &CacheKey) -> CacheWrite {
        let Ok(mut entries) = self.entries.lock() else {
            return CacheWrite::Degraded;
        };
        entries.remove(key.as_str());
        CacheWrite::Stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(tag: &str) -> CacheKey {
        CacheKey::derive("test", &json!({ "tag": tag }))
    }

    #[tokio::test]
    async fn test_round_trip_is_byte_identical() {
        let store = InMemoryCacheStore::new();
        let payload = r#"{"a":1,"b":"café","c":[null,true]}"#;

        store.set(&key("rt"), payload, Duration::from_secs(60)).await;
        assert_eq!(
            store.get(&key("rt")).await,
            CacheLookup::Hit(payload.to_string())
        );
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let store = InMemoryCacheStore::new();
        store.set(&key("ttl"), "v", Duration::ZERO).await;
        assert_eq!(store.get(&key("ttl")).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_remove_invalidates_before_ttl() {
        let store = InMemoryCacheStore::new();
        store.set(&key("rm"), "v", Duration::from_secs(60)).await;
        assert_eq!(store.remove(&key("rm")).await, CacheWrite::Stored);
        assert_eq!(store.get(&key("rm")).await, CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_wholesale() {
        let store = InMemoryCacheStore::new();
        store.set(&key("ow"), "old", Duration::from_secs(60)).await;
        store.set(&key("ow"), "new", Duration::from_secs(60)).await;
        assert_eq!(
            store.get(&key("ow")).await,
            CacheLookup::Hit("new".to_string())
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryCacheStore::new();
        store.set(&key("a"), "1", Duration::from_secs(60)).await;
        store.set(&key("b"), "2", Duration::from_secs(60)).await;
        store.remove(&key("a")).await;
        assert_eq!(store.get(&key("b")).await, CacheLookup::Hit("2".to_string()));
    }
}
