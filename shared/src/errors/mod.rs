//! Configuration and startup errors

use thiserror::Error;

/// Errors raised while loading configuration or initializing logging
///
/// These are startup faults: the process should refuse to start rather than
/// serve requests with a broken configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    MissingSecret { key: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
