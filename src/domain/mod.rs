//! Domain layer types and invariants.

pub mod actions;
pub mod error;
pub mod submissions;
