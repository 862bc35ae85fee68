//! Shared configuration library for Librarium.
//!
//! Centralizes config loading and validation so the server binary and any
//! future tooling agree on defaults, environment variable names, and
//! validation rules. Values come from, in order of precedence:
//! environment variables, an optional TOML file, built-in defaults.

pub mod error;
pub mod loader;
pub mod models;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use models::{Config, DatabaseConfig, ServerConfig};
