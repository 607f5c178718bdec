//! Domain-specific error types and error handling.

use thiserror::Error;

/// Token-related errors
///
/// Verification operations never surface these to callers: they are mapped
/// to a negative result and only recorded in logs. Construction operations
/// return them through `DomainError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject does not match")]
    SubjectMismatch,

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },
}

impl TokenError {
    /// Short machine-readable reason, used as a log field
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidTokenFormat => "malformed",
            TokenError::InvalidSignature => "bad_signature",
            TokenError::TokenExpired => "expired",
            TokenError::SubjectMismatch => "subject_mismatch",
            TokenError::MissingSecret => "missing_secret",
            TokenError::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_converts_to_domain_error() {
        let err: DomainError = TokenError::MissingSecret.into();
        assert!(matches!(err, DomainError::Token(TokenError::MissingSecret)));
        assert_eq!(err.to_string(), "Signing secret is not configured");
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(TokenError::TokenExpired.reason(), "expired");
        assert_eq!(
            TokenError::InvalidPayload { reason: "empty".into() }.reason(),
            "invalid_payload"
        );
    }
}
