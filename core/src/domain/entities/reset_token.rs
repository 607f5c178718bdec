//! Password reset token entity.
//!
//! Wire form: `subject.nonce.timestamp.signature`, where the signature is the
//! hex HMAC-SHA256 of `subject.nonce.timestamp`.

use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

/// Number of random bytes behind a token nonce (hex encoded to 64 chars)
pub const NONCE_BYTES: usize = 32;

/// A reset token split into its segments
///
/// Parsing checks shape only. The signature has not been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetToken<'a> {
    /// Account the token was issued for
    pub subject_id: i64,
    pub nonce: &'a str,
    /// Issue time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub signature: &'a str,
    signed_part: &'a str,
}

impl<'a> ResetToken<'a> {
    /// Split `token` into exactly four non-empty segments.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidTokenFormat` for a wrong segment count, an empty
    /// segment, or a subject id or timestamp that is not a decimal integer.
    pub fn parse(token: &'a str) -> Result<Self, TokenError> {
        let (signed_part, signature) = token
            .rsplit_once('.')
            .ok_or(TokenError::InvalidTokenFormat)?;

        let mut segments = signed_part.split('.');
        let (subject, nonce, timestamp) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(subject), Some(nonce), Some(timestamp), None) => (subject, nonce, timestamp),
                _ => return Err(TokenError::InvalidTokenFormat),
            };

        if [subject, nonce, timestamp, signature]
            .iter()
            .any(|segment| segment.is_empty())
        {
            return Err(TokenError::InvalidTokenFormat);
        }

        let subject_id = subject
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidTokenFormat)?;
        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidTokenFormat)?;

        Ok(Self {
            subject_id,
            nonce,
            timestamp,
            signature,
            signed_part,
        })
    }

    /// The exact text covered by the signature, as it appears in the token
    pub fn signed_part(&self) -> &'a str {
        self.signed_part
    }

    /// Milliseconds elapsed between issue and `now_millis`
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.timestamp)
    }
}

/// Text signed for a reset token
pub fn signing_input(subject_id: i64, nonce: &str, timestamp: i64) -> String {
    format!("{}.{}.{}", subject_id, nonce, timestamp)
}

/// Outcome of reset token verification
///
/// Serializes as `{"isValid": true, "subjectId": 42}`; `subjectId` is left
/// out for invalid tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenVerification {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<i64>,
}

impl ResetTokenVerification {
    /// Accepted token for `subject_id`
    pub fn valid(subject_id: i64) -> Self {
        Self {
            is_valid: true,
            subject_id: Some(subject_id),
        }
    }

    /// Rejected token, carrying no subject
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            subject_id: None,
        }
    }
}
