//! Numeric reset codes and their signed hashes.

use rand::{rngs::OsRng, RngCore};
use std::fmt;

use crate::errors::TokenError;

/// Length of a reset code
pub const RESET_CODE_LENGTH: usize = 6;

/// Default lifetime of a reset code hash (1 hour)
pub const DEFAULT_RESET_CODE_TTL_MILLIS: i64 = 3_600_000;

const CODE_FLOOR: u32 = 100_000;
const CODE_SPAN: u32 = 900_000;

/// A six digit reset code in `[100000, 999999]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResetCode(String);

impl ResetCode {
    /// Generate a code from 4 bytes of OS randomness
    pub fn generate() -> Self {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        Self::from_random_bytes(bytes)
    }

    /// Reduce four bytes, read big-endian, into the code range
    pub fn from_random_bytes(bytes: [u8; 4]) -> Self {
        let value = u32::from_be_bytes(bytes) % CODE_SPAN + CODE_FLOOR;
        Self(value.to_string())
    }

    /// The six digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the digit string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResetCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A stored reset code hash `subject.timestamp.hash`, split into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCodeHash<'a> {
    pub subject_id: i64,
    /// Hash time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub hash: &'a str,
    subject: &'a str,
    timestamp_raw: &'a str,
}

impl<'a> ResetCodeHash<'a> {
    /// Split `stored` into exactly three non-empty segments
    pub fn parse(stored: &'a str) -> Result<Self, TokenError> {
        let mut segments = stored.split('.');
        let (subject, timestamp_raw, hash) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(subject), Some(timestamp), Some(hash), None) => (subject, timestamp, hash),
                _ => return Err(TokenError::InvalidTokenFormat),
            };

        if subject.is_empty() || timestamp_raw.is_empty() || hash.is_empty() {
            return Err(TokenError::InvalidTokenFormat);
        }

        let subject_id = subject
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidTokenFormat)?;
        let timestamp = timestamp_raw
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidTokenFormat)?;

        Ok(Self {
            subject_id,
            timestamp,
            hash,
            subject,
            timestamp_raw,
        })
    }

    /// Text to sign when checking `code` against this hash
    pub fn signing_input(&self, code: &str) -> String {
        format!("{}-{}-{}", self.subject, code, self.timestamp_raw)
    }

    /// Whether more than `ttl_millis` passed between hashing and `now_millis`
    pub fn is_expired_at(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis.saturating_sub(self.timestamp) > ttl_millis
    }
}

/// Text signed for a reset code hash
pub fn code_signing_input(subject_id: i64, code: &str, timestamp: i64) -> String {
    format!("{}-{}-{}", subject_id, code, timestamp)
}
