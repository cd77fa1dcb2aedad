//! Cache Layer
//!
//! Key/value store with TTL used to memoize tokens and JSON payloads. The
//! cache is purely an optimization: a dead backend degrades to cache-miss
//! behavior, it never produces an error.

pub mod gate;
pub mod key;
pub mod memory;
pub mod store;

pub use gate::DegradeGate;
pub use key::CacheKey;
pub use memory::InMemoryCacheStore;
pub use store::{CacheLookup, CacheStore, CacheWrite, DegradedCacheStore, NoopCacheStore};
