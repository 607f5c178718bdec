//! Generic signed tokens.
//!
//! Two shapes exist:
//! - `nonce.timestamp.payload.signature`, binding an opaque payload to
//!   freshness data. The payload may contain dots.
//! - `payload.signature`, a compact form signed over the payload alone.

use super::reset_token::ResetToken;
use crate::errors::TokenError;

/// A four-part payload token split into its segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadToken<'a> {
    pub nonce: &'a str,
    /// Issue time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub payload: &'a str,
    pub signature: &'a str,
    signed_part: &'a str,
}

impl<'a> PayloadToken<'a> {
    /// Nonce and timestamp are the first two segments, the signature is the
    /// last one, and everything in between is the payload.
    pub fn parse(token: &'a str) -> Result<Self, TokenError> {
        let (signed_part, signature) = token
            .rsplit_once('.')
            .ok_or(TokenError::InvalidTokenFormat)?;

        let mut segments = signed_part.splitn(3, '.');
        let (nonce, timestamp, payload) = match (segments.next(), segments.next(), segments.next()) {
            (Some(nonce), Some(timestamp), Some(payload)) => (nonce, timestamp, payload),
            _ => return Err(TokenError::InvalidTokenFormat),
        };

        if [nonce, timestamp, payload, signature]
            .iter()
            .any(|segment| segment.is_empty())
        {
            return Err(TokenError::InvalidTokenFormat);
        }

        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidTokenFormat)?;

        Ok(Self {
            nonce,
            timestamp,
            payload,
            signature,
            signed_part,
        })
    }

    /// `nonce.timestamp.payload`, the bytes covered by the signature
    pub fn signed_part(&self) -> &'a str {
        self.signed_part
    }

    /// Milliseconds between issue and `now_millis`, saturating
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.timestamp)
    }
}

/// Text signed for a four-part payload token
pub fn payload_signing_input(nonce: &str, timestamp: i64, payload: &str) -> String {
    format!("{}.{}.{}", nonce, timestamp, payload)
}

/// Check that `payload` can be carried by the compact `payload.signature` form
pub fn validate_compact_payload(payload: &str) -> Result<(), TokenError> {
    if payload.is_empty() {
        return Err(TokenError::InvalidPayload {
            reason: "payload is empty".to_string(),
        });
    }
    if payload.contains('.') {
        return Err(TokenError::InvalidPayload {
            reason: "payload must not contain '.'".to_string(),
        });
    }
    Ok(())
}

/// A token presented together with an expected subject id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectToken<'a> {
    /// `subject.nonce.timestamp.signature`
    Bound(ResetToken<'a>),
    /// `payload.signature`; any identity lives inside the payload
    Compact { payload: &'a str, signature: &'a str },
}

impl<'a> SubjectToken<'a> {
    /// Try the four-part shape first, then the compact one
    pub fn parse(token: &'a str) -> Result<Self, TokenError> {
        if let Ok(bound) = ResetToken::parse(token) {
            return Ok(SubjectToken::Bound(bound));
        }

        let (payload, signature) = token
            .split_once('.')
            .ok_or(TokenError::InvalidTokenFormat)?;
        if signature.is_empty() || signature.contains('.') {
            return Err(TokenError::InvalidTokenFormat);
        }
        validate_compact_payload(payload).map_err(|_| TokenError::InvalidTokenFormat)?;

        Ok(SubjectToken::Compact { payload, signature })
    }
}
