//! Brew Cache: content proxy over a headless CMS, mail relays for the
//! contact and newsletter forms, and a cached client query layer.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod query;
pub mod util;
