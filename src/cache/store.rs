//! Query cache storage implementations.
//!
//! Entries are only judged by age; nothing is evicted.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A fetched query result and the moment it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
    pub data: Value,
    pub fetched_at: Instant,
}

impl CachedEntry {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        self.fetched_at.elapsed() < stale_time
    }
}

/// Storage seam for query results.
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<CachedEntry>;
    fn put(&self, key: QueryKey, data: Value);
    fn invalidate(&self, key: &QueryKey);
    fn clear(&self);
}

#[derive(Default)]
pub struct MemoryQueryCache {
    entries: RwLock<HashMap<QueryKey, CachedEntry>>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<CachedEntry> {
        rw_read(&self.entries, SOURCE, "get").get(key).cloned()
    }

    fn put(&self, key: QueryKey, data: Value) {
        rw_write(&self.entries, SOURCE, "put").insert(key, CachedEntry::new(data));
    }

    fn invalidate(&self, key: &QueryKey) {
        rw_write(&self.entries, SOURCE, "invalidate").remove(key);
    }

    fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

/// Cache that never stores anything; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopQueryCache;

impl QueryCache for NoopQueryCache {
    fn get(&self, _key: &QueryKey) -> Option<CachedEntry> {
        None
    }

    fn put(&self, _key: QueryKey, _data: Value) {}

    fn invalidate(&self, _key: &QueryKey) {}

    fn clear(&self) {}
}
