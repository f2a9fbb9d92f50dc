//! Configuration module
//!
//! Settings are read from `config.toml` in the user's config directory and
//! can be overridden from the environment.

pub mod config;

pub use config::{ApiConfig, Config, LoggingConfig, TableConfig};
