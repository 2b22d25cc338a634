//! Query cache configuration.

use std::time::Duration;

const DEFAULT_STALE_SECS: u64 = 60;

/// Controls how long fetched query results are served without refetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Serve cached results at all.
    pub enabled: bool,
    /// Age after which a cached result is refetched on next use.
    pub stale_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
        }
    }
}

impl CacheConfig {
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            stale_time,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
