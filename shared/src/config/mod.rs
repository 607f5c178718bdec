//! Configuration module
//!
//! - `environment` - Environment detection and logging configuration
//! - `tokens` - Signing secrets and lifetimes for reset tokens and codes

pub mod environment;
pub mod tokens;

use serde::{Deserialize, Serialize};

pub use environment::{Environment, LogFormat, LoggingConfig};
pub use tokens::{SecretSource, TokenConfig, DEFAULT_RESET_CODE_TTL_SECS};

use crate::errors::ConfigResult;

/// Complete application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,

    pub tokens: TokenConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load dotenv files, then build the configuration from the environment
    pub fn load() -> ConfigResult<Self> {
        // Environment specific file first so its values take precedence
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration using `lookup` to read variables
    ///
    /// Fails on an unrecognised environment name, a missing production
    /// secret or an invalid override.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::try_from_lookup(&lookup)?;
        let logging = LoggingConfig::from_lookup(environment, &lookup)?;
        let tokens = TokenConfig::from_lookup(environment, &lookup)?;

        Ok(Self {
            environment,
            tokens,
            logging,
        })
    }
}
