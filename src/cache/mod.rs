//! Brew Cache query cache
//!
//! Client-side storage for content query results, keyed by [`QueryKey`].
//! Results are served while fresh (younger than the configured stale time)
//! and refetched afterwards. Storage sits behind the [`QueryCache`] trait so
//! callers can inject [`NoopQueryCache`] in tests.

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::QueryKey;
pub use store::{CachedEntry, MemoryQueryCache, NoopQueryCache, QueryCache};

pub(crate) use lock::{rw_read, rw_write};
