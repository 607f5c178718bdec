//! Signing secrets and lifetimes for reset tokens and reset codes

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::environment::Environment;
use crate::errors::{ConfigError, ConfigResult};

/// Default reset code lifetime (1 hour)
pub const DEFAULT_RESET_CODE_TTL_SECS: i64 = 3600;

/// Upper bound on the reset code lifetime (7 days)
pub const MAX_RESET_CODE_TTL_SECS: i64 = 7 * 24 * 3600;

/// Secrets shorter than this are accepted but logged as weak
pub const MIN_SECRET_LENGTH: usize = 32;

/// Where the active signing secret came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretSource {
    /// `RESET_TOKEN_SECRET`
    #[default]
    Configured,
    /// `JWT_SECRET`, used when no dedicated secret is set
    JwtFallback,
    /// Random per-process key, outside production only
    Generated,
}

/// Token signing configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Active HMAC secret, used for signing and verification
    #[serde(skip_serializing)]
    pub secret: String,

    /// Retired secrets still accepted for verification, newest first
    #[serde(default, skip_serializing)]
    pub previous_secrets: Vec<String>,

    /// Reset code lifetime in seconds
    #[serde(default = "default_reset_code_ttl_secs")]
    pub reset_code_ttl_secs: i64,

    /// Where `secret` came from
    #[serde(skip)]
    pub secret_source: SecretSource,
}

impl TokenConfig {
    /// Config with an explicit secret and default lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            previous_secrets: Vec::new(),
            reset_code_ttl_secs: DEFAULT_RESET_CODE_TTL_SECS,
            secret_source: SecretSource::Configured,
        }
    }

    /// Load from the process environment
    pub fn from_env(env: Environment) -> ConfigResult<Self> {
        Self::from_lookup(env, |key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    ///
    /// The secret comes from `RESET_TOKEN_SECRET`, then `JWT_SECRET`. When
    /// neither is set, production fails and other environments get a random
    /// key that does not survive a restart.
    pub fn from_lookup<F>(env: Environment, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let (secret, secret_source) = if let Some(secret) = non_empty("RESET_TOKEN_SECRET") {
            (secret, SecretSource::Configured)
        } else if let Some(secret) = non_empty("JWT_SECRET") {
            tracing::info!("RESET_TOKEN_SECRET is not set, reset tokens are signed with JWT_SECRET");
            (secret, SecretSource::JwtFallback)
        } else if env.is_production() {
            tracing::error!("No reset token secret configured in production");
            return Err(ConfigError::MissingSecret {
                key: "RESET_TOKEN_SECRET".to_string(),
            });
        } else {
            tracing::warn!(
                environment = %env,
                "No reset token secret configured; generated a temporary key. \
                 Tokens and reset codes will not survive a restart"
            );
            (generate_secret(), SecretSource::Generated)
        };

        if secret.len() < MIN_SECRET_LENGTH {
            tracing::warn!(
                length = secret.len(),
                minimum = MIN_SECRET_LENGTH,
                "Reset token secret is shorter than recommended"
            );
        }

        let previous_secrets: Vec<String> = lookup("RESET_TOKEN_PREVIOUS_SECRETS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let reset_code_ttl_secs = match lookup("RESET_CODE_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_RESET_CODE_TTL_SECS).contains(secs))
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "RESET_CODE_TTL_SECS".to_string(),
                    reason: format!(
                        "expected 1 to {} seconds, got '{}'",
                        MAX_RESET_CODE_TTL_SECS, raw
                    ),
                })?,
            None => DEFAULT_RESET_CODE_TTL_SECS,
        };

        Ok(Self {
            secret,
            previous_secrets,
            reset_code_ttl_secs,
            secret_source,
        })
    }

    /// True when the secret is a per-process random key
    pub fn is_generated(&self) -> bool {
        self.secret_source == SecretSource::Generated
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("previous_secrets", &self.previous_secrets.len())
            .field("reset_code_ttl_secs", &self.reset_code_ttl_secs)
            .field("secret_source", &self.secret_source)
            .finish()
    }
}

/// 32 random bytes, hex encoded
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn default_reset_code_ttl_secs() -> i64 {
    DEFAULT_RESET_CODE_TTL_SECS
}
