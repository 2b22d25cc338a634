//! Application services: the content proxy and the mail relays.

pub mod error;
pub mod proxy;
pub mod relay;
pub mod sources;
