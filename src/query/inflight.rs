use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use super::error::QueryError;
use crate::cache::QueryKey;

pub type SharedFetch = Shared<BoxFuture<'static, Result<Value, QueryError>>>;

struct Flight {
    generation: u64,
    fetch: SharedFetch,
}

/// Whether the caller started the request or joined one already running.
pub enum Joined {
    Started(SharedFetch),
    Existing(SharedFetch),
}

impl Joined {
    pub fn into_fetch(self) -> SharedFetch {
        match self {
            Joined::Started(fetch) | Joined::Existing(fetch) => fetch,
        }
    }
}

/// Requests currently running, one per key.
#[derive(Clone, Default)]
pub struct InFlightRequests {
    requests: Arc<DashMap<QueryKey, Flight>>,
    next_generation: Arc<AtomicU64>,
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the request running for `key`, or start one built by `start`.
    ///
    /// `start` receives the generation the new flight is registered under;
    /// pass it to [`InFlightRequests::finish`] when the request settles.
    pub fn join_or_start<F>(&self, key: &QueryKey, start: F) -> Joined
    where
        F: FnOnce(u64) -> BoxFuture<'static, Result<Value, QueryError>>,
    {
        match self.requests.entry(key.clone()) {
            Entry::Occupied(occupied) => Joined::Existing(occupied.get().fetch.clone()),
            Entry::Vacant(vacant) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let fetch = start(generation).shared();
                vacant.insert(Flight {
                    generation,
                    fetch: fetch.clone(),
                });
                Joined::Started(fetch)
            }
        }
    }

    /// Forget the flight for `key` if it is still the one registered under `generation`.
    pub fn finish(&self, key: &QueryKey, generation: u64) {
        self.requests
            .remove_if(key, |_, flight| flight.generation == generation);
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.requests.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
