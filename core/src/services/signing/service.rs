//! Signed token service implementation

use chrono::Duration;
use rand::{rngs::OsRng, RngCore};
use rd_shared::TokenConfig;

use crate::domain::entities::reset_code::{code_signing_input, ResetCode, ResetCodeHash};
use crate::domain::entities::reset_token::{
    signing_input, ResetToken, ResetTokenVerification, NONCE_BYTES,
};
use crate::domain::entities::signed_token::{
    payload_signing_input, validate_compact_payload, PayloadToken, SubjectToken,
};
use crate::errors::{DomainError, DomainResult, TokenError};

use super::clock::{Clock, SystemClock};
use super::config::SignedTokenConfig;
use super::keys::{SigningKeys, TokenFamily};

/// Stateless service for reset tokens, generic signed tokens and reset codes
///
/// Nothing is stored: a token is valid when its signature matches one of the
/// configured secrets (and, where enforced, its timestamp is recent enough).
/// Verification methods never fail; malformed, forged and expired input all
/// produce the same negative result, with the reason only logged at debug
/// level. One-time use is up to the caller.
#[derive(Debug, Clone)]
pub struct SignedTokenService<C: Clock = SystemClock> {
    keys: SigningKeys,
    reset_code_ttl: Duration,
    clock: C,
}

impl SignedTokenService<SystemClock> {
    /// Creates a service using the wall clock
    ///
    /// # Errors
    ///
    /// Fails when the secret is empty or the reset code lifetime is not
    /// positive. Both are configuration faults and should stop startup.
    pub fn new(config: SignedTokenConfig) -> DomainResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a service from the loaded application token configuration
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), and when the configured lifetime is out of
    /// range for a `Duration`.
    pub fn from_token_config(config: &TokenConfig) -> DomainResult<Self> {
        if config.is_generated() {
            tracing::warn!("Signed token service is using a generated secret");
        }
        Self::new(SignedTokenConfig::try_from(config)?)
    }
}

impl<C: Clock> SignedTokenService<C> {
    /// Creates a service reading time from `clock`
    pub fn with_clock(config: SignedTokenConfig, clock: C) -> DomainResult<Self> {
        if config.reset_code_ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "Reset code lifetime must be positive".to_string(),
            });
        }

        let keys = SigningKeys::new(&config.secret, &config.previous_secrets)?;

        tracing::debug!(
            keys = keys.key_count(),
            reset_code_ttl_secs = config.reset_code_ttl.num_seconds(),
            "Signed token service initialized"
        );

        Ok(Self {
            keys,
            reset_code_ttl: config.reset_code_ttl,
            clock,
        })
    }

    /// Hex encoded random nonce
    fn generate_nonce() -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn check_signature(
        &self,
        family: TokenFamily,
        message: &str,
        signature: &str,
    ) -> Result<(), TokenError> {
        if self.keys.verify(family, message, signature) {
            Ok(())
        } else {
            Err(TokenError::InvalidSignature)
        }
    }

    fn check_age(age_millis: i64, max_age: Option<Duration>) -> Result<(), TokenError> {
        match max_age {
            Some(max_age) if age_millis > max_age.num_milliseconds() => Err(TokenError::TokenExpired),
            _ => Ok(()),
        }
    }

    fn log_rejection(kind: &'static str, error: &TokenError) {
        tracing::debug!(kind, reason = error.reason(), "Token verification failed");
    }

    // ---- Reset tokens ----

    /// Creates `subject.nonce.timestamp.signature` for a password reset
    pub fn create_signed_reset_token(&self, subject_id: i64) -> String {
        let nonce = Self::generate_nonce();
        let timestamp = self.clock.now_millis();
        let signed_part = signing_input(subject_id, &nonce, timestamp);
        let signature = self.keys.sign(TokenFamily::ResetToken, &signed_part);

        tracing::debug!(subject_id, "Issued reset token");
        format!("{}.{}", signed_part, signature)
    }

    /// Verifies a reset token's shape and signature.
    ///
    /// The embedded timestamp is not checked; use
    /// [`verify_reset_token_within`](Self::verify_reset_token_within) to
    /// bound the token age.
    pub fn verify_reset_token(&self, token: &str) -> ResetTokenVerification {
        self.verify_reset_token_inner(token, None)
    }

    /// Like [`verify_reset_token`](Self::verify_reset_token), also rejecting
    /// tokens issued more than `max_age` ago
    pub fn verify_reset_token_within(&self, token: &str, max_age: Duration) -> ResetTokenVerification {
        self.verify_reset_token_inner(token, Some(max_age))
    }

    fn verify_reset_token_inner(
        &self,
        token: &str,
        max_age: Option<Duration>,
    ) -> ResetTokenVerification {
        let result = ResetToken::parse(token).and_then(|parsed| {
            let signed_part = parsed.signed_part();
            self.check_signature(TokenFamily::ResetToken, signed_part, parsed.signature)?;
            Self::check_age(parsed.age_millis(self.clock.now_millis()), max_age)?;
            Ok(parsed.subject_id)
        });

        match result {
            Ok(subject_id) => ResetTokenVerification::valid(subject_id),
            Err(e) => {
                Self::log_rejection("reset_token", &e);
                ResetTokenVerification::invalid()
            }
        }
    }

    // ---- Generic signed tokens ----

    /// Creates `nonce.timestamp.payload.signature` binding an opaque payload
    pub fn create_signed_token(&self, payload: &str) -> String {
        let nonce = Self::generate_nonce();
        let timestamp = self.clock.now_millis();
        let signed_part = payload_signing_input(&nonce, timestamp, payload);
        let signature = self.keys.sign(TokenFamily::SignedPayload, &signed_part);

        format!("{}.{}", signed_part, signature)
    }

    /// Verifies a token from [`create_signed_token`](Self::create_signed_token)
    /// and returns its payload.
    ///
    /// With `max_age` set, tokens issued longer ago are rejected.
    pub fn verify_signed_token(&self, token: &str, max_age: Option<Duration>) -> Option<String> {
        let result = PayloadToken::parse(token).and_then(|parsed| {
            let signed_part = parsed.signed_part();
            self.check_signature(TokenFamily::SignedPayload, signed_part, parsed.signature)?;
            Self::check_age(parsed.age_millis(self.clock.now_millis()), max_age)?;
            Ok(parsed.payload.to_string())
        });

        result
            .map_err(|e| Self::log_rejection("signed_token", &e))
            .ok()
    }

    /// Creates the compact `payload.signature` form, signed over the payload
    /// alone.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidPayload` when the payload is empty or contains `.`.
    pub fn create_payload_token(&self, payload: &str) -> DomainResult<String> {
        validate_compact_payload(payload)?;
        Ok(format!("{}.{}", payload, self.keys.sign(TokenFamily::Compact, payload)))
    }

    /// Verifies a token presented for `subject_id`.
    ///
    /// Four-part tokens must embed exactly `subject_id` and carry a valid
    /// reset token signature over `subject.nonce.timestamp`. Compact
    /// `payload.signature` tokens from
    /// [`create_payload_token`](Self::create_payload_token) are checked over
    /// the payload alone; binding them to the subject is the caller's job.
    /// The embedded timestamp is not checked.
    pub fn verify_token_with_user_id(&self, token: &str, subject_id: i64) -> bool {
        self.verify_subject_token(token, subject_id, None)
    }

    /// Like [`verify_token_with_user_id`](Self::verify_token_with_user_id),
    /// also rejecting four-part tokens issued more than `max_age` ago.
    ///
    /// Compact tokens carry no issue time and are always rejected here.
    pub fn verify_token_with_user_id_within(
        &self,
        token: &str,
        subject_id: i64,
        max_age: Duration,
    ) -> bool {
        self.verify_subject_token(token, subject_id, Some(max_age))
    }

    fn verify_subject_token(
        &self,
        token: &str,
        subject_id: i64,
        max_age: Option<Duration>,
    ) -> bool {
        let result = SubjectToken::parse(token).and_then(|parsed| match parsed {
            SubjectToken::Bound(bound) => {
                if bound.subject_id != subject_id {
                    return Err(TokenError::SubjectMismatch);
                }
                let message = signing_input(subject_id, bound.nonce, bound.timestamp);
                self.check_signature(TokenFamily::ResetToken, &message, bound.signature)?;
                Self::check_age(bound.age_millis(self.clock.now_millis()), max_age)
            }
            SubjectToken::Compact { .. } if max_age.is_some() => Err(TokenError::TokenExpired),
            SubjectToken::Compact { payload, signature } => {
                self.check_signature(TokenFamily::Compact, payload, signature)
            }
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                Self::log_rejection("subject_token", &e);
                false
            }
        }
    }

    // ---- Reset codes ----

    /// Generates a six digit reset code
    pub fn generate_reset_code(&self) -> ResetCode {
        ResetCode::generate()
    }

    /// Binds `code` to `subject_id` and the current time.
    ///
    /// Returns `subject.timestamp.hash`; the code itself is not recoverable
    /// from the result.
    pub fn hash_reset_code(&self, code: &str, subject_id: i64) -> String {
        let timestamp = self.clock.now_millis();
        let message = code_signing_input(subject_id, code, timestamp);
        let hash = self.keys.sign(TokenFamily::ResetCode, &message);

        format!("{}.{}.{}", subject_id, timestamp, hash)
    }

    /// Checks a user-entered `code` against a stored hash.
    ///
    /// Expired and forged hashes are indistinguishable to the caller.
    pub fn verify_reset_code(&self, code: &str, stored_hash: &str) -> bool {
        let ttl_millis = self.reset_code_ttl.num_milliseconds();
        let result = ResetCodeHash::parse(stored_hash).and_then(|parsed| {
            if parsed.is_expired_at(self.clock.now_millis(), ttl_millis) {
                return Err(TokenError::TokenExpired);
            }
            let message = parsed.signing_input(code);
            self.check_signature(TokenFamily::ResetCode, &message, parsed.hash)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                Self::log_rejection("reset_code", &e);
                false
            }
        }
    }

    /// Lifetime applied by [`verify_reset_code`](Self::verify_reset_code)
    pub fn reset_code_ttl(&self) -> Duration {
        self.reset_code_ttl
    }
}
