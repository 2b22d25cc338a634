//! Client query layer: typed fetches over the content proxy with caching,
//! in-flight de-duplication and a tri-state result for views.

mod api;
mod client;
mod error;
mod inflight;
mod queries;
mod state;

pub use api::ContentApi;
pub use client::QueryClient;
pub use error::QueryError;
pub use inflight::{InFlightRequests, Joined, SharedFetch};
pub use queries::ContentQueries;
pub use state::QueryState;
