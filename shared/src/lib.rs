//! Shared configuration and startup utilities for the Reeldiary server
//!
//! - Environment detection
//! - Token secret and logging configuration
//! - Configuration errors
//! - Tracing subscriber setup

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{AppConfig, Environment, LogFormat, LoggingConfig, SecretSource, TokenConfig};
pub use errors::{ConfigError, ConfigResult};
pub use logging::init_tracing;
