//! Configuration loading for the counsel tool.
//!
//! Uses figment for YAML-based configuration with sensible defaults and a
//! `COUNSEL_`-prefixed environment overlay.

pub mod schema;

pub use schema::{Config, ProviderSettings};
