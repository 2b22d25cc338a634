//! Key-based query client: fresh cache hits, shared in-flight requests,
//! and per-key error state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use futures::FutureExt;
use metrics::counter;
use serde_json::Value;
use tracing::debug;

use super::error::QueryError;
use super::inflight::{InFlightRequests, Joined};
use super::state::QueryState;
use crate::cache::{CacheConfig, QueryCache, QueryKey, rw_read, rw_write};

const SOURCE: &str = "query::client";

pub struct QueryClient {
    cache: Arc<dyn QueryCache>,
    config: CacheConfig,
    in_flight: InFlightRequests,
    errors: Arc<RwLock<HashMap<QueryKey, QueryError>>>,
}

impl QueryClient {
    pub fn new(cache: Arc<dyn QueryCache>, config: CacheConfig) -> Self {
        Self {
            cache,
            config,
            in_flight: InFlightRequests::new(),
            errors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Resolve `key`, calling `fetcher` only when no fresh result is cached
    /// and no request for the same key is already running.
    ///
    /// A successful fetch is cached under `key`. A failure is recorded for
    /// `key` alone and leaves every cached entry untouched.
    pub async fn fetch_query<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Value, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, QueryError>> + Send + 'static,
    {
        if let Some(data) = self.fresh(&key) {
            counter!("brewcache_query_cache_hit_total", "query" => key.name()).increment(1);
            debug!(target = "brewcache::query", key = %key, "served from cache");
            return Ok(data);
        }

        let joined = self.in_flight.join_or_start(&key, |generation| {
            counter!("brewcache_query_cache_miss_total", "query" => key.name()).increment(1);
            debug!(target = "brewcache::query", key = %key, "starting request");
            let request = fetcher();
            let cache = self.config.enabled.then(|| Arc::clone(&self.cache));
            let errors = Arc::clone(&self.errors);
            let flight = FlightGuard {
                in_flight: self.in_flight.clone(),
                key: key.clone(),
                generation,
            };
            // Runs detached: a caller that stops waiting does not cancel the request.
            let task = tokio::spawn(async move {
                let result = request.await;
                match &result {
                    Ok(data) => {
                        if let Some(cache) = cache {
                            cache.put(flight.key.clone(), data.clone());
                        }
                        rw_write(&errors, SOURCE, "clear_error").remove(&flight.key);
                    }
                    Err(err) => {
                        rw_write(&errors, SOURCE, "record_error")
                            .insert(flight.key.clone(), err.clone());
                    }
                }
                drop(flight);
                result
            });
            async move {
                task.await
                    .unwrap_or_else(|err| Err(QueryError::Task(err.to_string())))
            }
            .boxed()
        });

        if let Joined::Existing(_) = &joined {
            counter!("brewcache_query_dedup_total", "query" => key.name()).increment(1);
            debug!(target = "brewcache::query", key = %key, "joined in-flight request");
        }

        joined.into_fetch().await
    }

    /// Same as [`QueryClient::fetch_query`], reported as a view state.
    pub async fn query<F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, QueryError>> + Send + 'static,
    {
        self.fetch_query(key, fetcher).await.into()
    }

    /// Current state of `key` without starting a request.
    ///
    /// Returns `None` when the key was never requested.
    pub fn peek(&self, key: &QueryKey) -> Option<QueryState<Value>> {
        if let Some(data) = self.fresh(key) {
            return Some(QueryState::Success(data));
        }
        if self.in_flight.contains(key) {
            return Some(QueryState::Loading);
        }
        if let Some(err) = rw_read(&self.errors, SOURCE, "peek_error").get(key) {
            return Some(QueryState::Error(err.clone()));
        }
        self.cached(key).map(QueryState::Success)
    }

    /// Drop the cached result for `key` so the next use refetches it.
    pub fn invalidate(&self, key: &QueryKey) {
        self.cache.invalidate(key);
        rw_write(&self.errors, SOURCE, "invalidate").remove(key);
    }

    pub fn clear(&self) {
        self.cache.clear();
        rw_write(&self.errors, SOURCE, "clear").clear();
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.contains(key)
    }

    fn cached(&self, key: &QueryKey) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }
        self.cache.get(key).map(|entry| entry.data)
    }

    fn fresh(&self, key: &QueryKey) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }
        self.cache
            .get(key)
            .filter(|entry| entry.is_fresh(self.config.stale_time))
            .map(|entry| entry.data)
    }
}

/// Unregisters a flight when its task ends, including by panic.
struct FlightGuard {
    in_flight: InFlightRequests,
    key: QueryKey,
    generation: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.finish(&self.key, self.generation);
    }
}
