//! HMAC-SHA256 signing keys

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

use super::compare::secure_compare;
use crate::errors::{DomainError, DomainResult, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Kind of value a signature was issued for
///
/// Each family signs with its own key derived from the configured secret,
/// so a signature issued for one family never verifies as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFamily {
    /// `subject.nonce.timestamp.signature` reset tokens
    ResetToken,
    /// `nonce.timestamp.payload.signature` tokens
    SignedPayload,
    /// Compact `payload.signature` tokens
    Compact,
    /// `subject.timestamp.hash` reset code hashes
    ResetCode,
}

impl TokenFamily {
    /// Every family, in a fixed order
    pub const ALL: [TokenFamily; 4] = [
        TokenFamily::ResetToken,
        TokenFamily::SignedPayload,
        TokenFamily::Compact,
        TokenFamily::ResetCode,
    ];

    /// Derivation label, part of the key schedule and never changed
    fn label(self) -> &'static str {
        match self {
            TokenFamily::ResetToken => "rd-signing/v1/reset-token",
            TokenFamily::SignedPayload => "rd-signing/v1/signed-payload",
            TokenFamily::Compact => "rd-signing/v1/compact",
            TokenFamily::ResetCode => "rd-signing/v1/reset-code",
        }
    }
}

/// Per-family keys derived from one secret
#[derive(Clone)]
struct FamilyKeys {
    reset_token: HmacSha256,
    signed_payload: HmacSha256,
    compact: HmacSha256,
    reset_code: HmacSha256,
}

impl FamilyKeys {
    /// Family key = HMAC-SHA256(secret, family label)
    fn derive(secret: &str) -> DomainResult<Self> {
        let root = keyed(secret.as_bytes())?;
        let derive = |family: TokenFamily| {
            let derived = root.clone().chain_update(family.label()).finalize().into_bytes();
            keyed(&derived)
        };

        Ok(Self {
            reset_token: derive(TokenFamily::ResetToken)?,
            signed_payload: derive(TokenFamily::SignedPayload)?,
            compact: derive(TokenFamily::Compact)?,
            reset_code: derive(TokenFamily::ResetCode)?,
        })
    }

    fn get(&self, family: TokenFamily) -> &HmacSha256 {
        match family {
            TokenFamily::ResetToken => &self.reset_token,
            TokenFamily::SignedPayload => &self.signed_payload,
            TokenFamily::Compact => &self.compact,
            TokenFamily::ResetCode => &self.reset_code,
        }
    }
}

fn keyed(key: &[u8]) -> DomainResult<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| DomainError::Internal {
        message: format!("Failed to key HMAC: {}", e),
    })
}

fn sign_with(key: &HmacSha256, message: &str) -> String {
    let mut mac = key.clone();
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Keyed HMAC state for the active secret and any retired ones
///
/// Signing always uses the active secret. Verification accepts a signature
/// from any configured secret, but only under the family it was issued for.
#[derive(Clone)]
pub struct SigningKeys {
    active: FamilyKeys,
    retired: Vec<FamilyKeys>,
}

impl SigningKeys {
    /// Derives family keys for `active` and every non-empty `retired` secret
    pub fn new(active: &str, retired: &[String]) -> DomainResult<Self> {
        if active.is_empty() {
            return Err(TokenError::MissingSecret.into());
        }

        let active = FamilyKeys::derive(active)?;
        let retired = retired
            .iter()
            .filter(|secret| !secret.is_empty())
            .map(|secret| FamilyKeys::derive(secret))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self { active, retired })
    }

    /// Lowercase hex HMAC of `message` under the active secret's `family` key
    pub fn sign(&self, family: TokenFamily, message: &str) -> String {
        sign_with(self.active.get(family), message)
    }

    /// Check `signature` against the `family` key of every configured secret.
    ///
    /// All keys are always tried so the time taken does not depend on which
    /// key, if any, matched.
    pub fn verify(&self, family: TokenFamily, message: &str, signature: &str) -> bool {
        let mut matched = secure_compare(&self.sign(family, message), signature);
        for keys in &self.retired {
            matched |= secure_compare(&sign_with(keys.get(family), message), signature);
        }
        matched
    }

    /// Number of secrets accepted for verification
    pub fn key_count(&self) -> usize {
        1 + self.retired.len()
    }
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("keys", &self.key_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2
        let key = keyed(b"Jefe").unwrap();
        assert_eq!(
            sign_with(&key, "what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_family_key_is_hmac_of_label() {
        let keys = SigningKeys::new("Jefe", &[]).unwrap();

        let mut root = HmacSha256::new_from_slice(b"Jefe").unwrap();
        root.update(b"rd-signing/v1/reset-code");
        let derived = root.finalize().into_bytes();
        let mut mac = HmacSha256::new_from_slice(&derived).unwrap();
        mac.update(b"42-123456-1700000000000");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(keys.sign(TokenFamily::ResetCode, "42-123456-1700000000000"), expected);
    }

    #[test]
    fn test_families_sign_differently() {
        let keys = SigningKeys::new("secret-a", &[]).unwrap();

        for (i, first) in TokenFamily::ALL.iter().enumerate() {
            let signature = keys.sign(*first, "payload");
            assert_eq!(signature.len(), 64);
            assert!(keys.verify(*first, "payload", &signature));

            for second in &TokenFamily::ALL[i + 1..] {
                assert_ne!(signature, keys.sign(*second, "payload"));
                let accepted = keys.verify(*second, "payload", &signature);
                assert!(!accepted, "{:?} as {:?}", first, second);
            }
        }
    }

    #[test]
    fn test_sign_is_deterministic_per_secret() {
        let a = SigningKeys::new("secret-a", &[]).unwrap();
        let b = SigningKeys::new("secret-b", &[]).unwrap();
        let family = TokenFamily::SignedPayload;

        assert_eq!(a.sign(family, "payload"), a.sign(family, "payload"));
        assert_ne!(a.sign(family, "payload"), b.sign(family, "payload"));
    }

    #[test]
    fn test_verify_with_retired_secret() {
        let old = SigningKeys::new("old-secret", &[]).unwrap();
        let rotated = SigningKeys::new("new-secret", &["old-secret".to_string()]).unwrap();
        let family = TokenFamily::ResetToken;
        let signature = old.sign(family, "message");

        assert!(rotated.verify(family, "message", &signature));
        assert!(!rotated.verify(family, "other message", &signature));
        assert!(!rotated.verify(TokenFamily::Compact, "message", &signature));
        let strict = SigningKeys::new("new-secret", &[]).unwrap();
        assert!(!strict.verify(family, "message", &signature));
        assert_eq!(rotated.key_count(), 2);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            SigningKeys::new("", &[]),
            Err(DomainError::Token(TokenError::MissingSecret))
        ));

        // Blank retired entries are skipped rather than keyed
        let keys = SigningKeys::new("secret", &[String::new()]).unwrap();
        assert_eq!(keys.key_count(), 1);
    }

    #[test]
    fn test_debug_does_not_leak_key_material() {
        let keys = SigningKeys::new("very-secret", &[]).unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("keys: 1"));
    }
}
