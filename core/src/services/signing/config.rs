//! Configuration for the signed token service

use chrono::Duration;
use rd_shared::TokenConfig;
use std::fmt;

use crate::domain::entities::DEFAULT_RESET_CODE_TTL_MILLIS;
use crate::errors::DomainError;

/// Configuration for the signed token service
#[derive(Clone)]
pub struct SignedTokenConfig {
    /// Secret used to sign new tokens
    pub secret: String,
    /// Retired secrets still accepted during verification
    pub previous_secrets: Vec<String>,
    /// How long a reset code hash stays valid
    pub reset_code_ttl: Duration,
}

impl SignedTokenConfig {
    /// Config signing with `secret`, no retired secrets and the default
    /// one hour reset code lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            previous_secrets: Vec::new(),
            reset_code_ttl: Duration::milliseconds(DEFAULT_RESET_CODE_TTL_MILLIS),
        }
    }

    /// Also accept signatures made with a retired `secret`
    pub fn with_previous_secret(mut self, secret: impl Into<String>) -> Self {
        self.previous_secrets.push(secret.into());
        self
    }

    /// Override the reset code lifetime
    pub fn with_reset_code_ttl(mut self, ttl: Duration) -> Self {
        self.reset_code_ttl = ttl;
        self
    }
}

impl TryFrom<&TokenConfig> for SignedTokenConfig {
    type Error = DomainError;

    /// Fails when `reset_code_ttl_secs` does not fit in a `Duration`
    fn try_from(config: &TokenConfig) -> Result<Self, Self::Error> {
        let reset_code_ttl = Duration::try_seconds(config.reset_code_ttl_secs).ok_or_else(|| {
            DomainError::Validation {
                message: format!(
                    "Reset code lifetime of {} seconds is out of range",
                    config.reset_code_ttl_secs
                ),
            }
        })?;

        Ok(Self {
            secret: config.secret.clone(),
            previous_secrets: config.previous_secrets.clone(),
            reset_code_ttl,
        })
    }
}

impl fmt::Debug for SignedTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedTokenConfig")
            .field("secret", &"[REDACTED]")
            .field("previous_secrets", &self.previous_secrets.len())
            .field("reset_code_ttl", &self.reset_code_ttl)
            .finish()
    }
}
