//! Deployment environment and logging configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ConfigError, ConfigResult};

const ENVIRONMENT_KEYS: [&str; 3] = ["ENVIRONMENT", "ENV", "RUST_ENV"];

/// Deployment environment the service runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// True only for production deployments
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// True only for local development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Resolve the environment from `ENVIRONMENT`, `ENV` or `RUST_ENV`.
    ///
    /// Unset values mean development. An unrecognised value is an error,
    /// so a misspelled production deployment cannot start as development.
    pub fn try_from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        ENVIRONMENT_KEYS
            .iter()
            .find_map(|key| lookup(*key))
            .map_or(Ok(Environment::default()), |value| value.parse())
    }

    /// Like [`try_from_lookup`](Self::try_from_lookup), but an unrecognised
    /// value is logged and falls back to development
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::try_from_lookup(lookup).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to the development environment");
            Environment::default()
        })
    }

    /// Lenient lookup over the process environment, used to pick dotenv files
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment specific dotenv file, loaded before the plain `.env`
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Development => ".env.development",
            Environment::Staging => ".env.staging",
            Environment::Production => ".env.production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "ENVIRONMENT".to_string(),
                reason: format!("unknown environment '{}'", s),
            }),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                reason: format!("unknown log format '{}'", s),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,

    /// Output format of the subscriber
    pub format: LogFormat,

    /// Colored output (terminal only)
    pub colored: bool,

    /// Include file and line of the event
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Defaults for `env`: verbose pretty output in development, JSON elsewhere
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                colored: true,
                source_location: true,
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
            Environment::Production => Self {
                level: String::from("warn"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
        }
    }

    /// Environment defaults, with `LOG_LEVEL` and `LOG_FORMAT` overrides
    pub fn from_lookup<F>(env: Environment, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::for_environment(env);
        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup_from;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("invalid".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_lookup_order() {
        let env = Environment::from_lookup(lookup_from(&[
            ("ENV", "staging"),
            ("RUST_ENV", "production"),
        ]));
        assert_eq!(env, Environment::Staging);

        let env = Environment::from_lookup(lookup_from(&[]));
        assert_eq!(env, Environment::Development);

        let env = Environment::from_lookup(lookup_from(&[("ENVIRONMENT", "moon")]));
        assert_eq!(env, Environment::Development);
    }

    #[test]
    fn test_unrecognised_environment_is_an_error() {
        let result = Environment::try_from_lookup(lookup_from(&[("ENVIRONMENT", "prdo")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        // ENVIRONMENT wins, so a valid ENV does not hide the misspelling
        let result = Environment::try_from_lookup(lookup_from(&[
            ("ENVIRONMENT", "prdo"),
            ("ENV", "production"),
        ]));
        assert!(result.is_err());

        let env = Environment::try_from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(env, Environment::Development);
    }

    #[test]
    fn test_logging_config_for_environment() {
        let dev = LoggingConfig::for_environment(Environment::Development);
        assert_eq!(dev.level, "debug");
        assert_eq!(dev.format, LogFormat::Pretty);
        assert!(dev.source_location);

        let prod = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod.level, "warn");
        assert_eq!(prod.format, LogFormat::Json);
        assert!(!prod.colored);
    }

    #[test]
    fn test_logging_config_overrides() {
        let config = LoggingConfig::from_lookup(
            Environment::Production,
            lookup_from(&[("LOG_LEVEL", "rd_core=trace"), ("LOG_FORMAT", "compact")]),
        )
        .unwrap();
        assert_eq!(config.level, "rd_core=trace");
        assert_eq!(config.format, LogFormat::Compact);

        let result = LoggingConfig::from_lookup(
            Environment::Production,
            lookup_from(&[("LOG_FORMAT", "xml")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
