//! Unit tests keeping token families apart under one secret

use super::mocks::{service_with_clock, FixedClock, START_MILLIS};
use crate::services::signing::SignedTokenService;

const SUBJECT: i64 = 42;
const CODE: &str = "123456";

/// Outcome of every verifier for `token`: reset token, signed token,
/// subject token and reset code, in that order
fn accepted_by(service: &SignedTokenService<FixedClock>, token: &str) -> [bool; 4] {
    [
        service.verify_reset_token(token).is_valid,
        service.verify_signed_token(token, None).is_some(),
        service.verify_token_with_user_id(token, SUBJECT),
        service.verify_reset_code(CODE, token),
    ]
}

#[test]
fn test_each_family_only_verifies_as_itself() {
    let (service, _) = service_with_clock();
    let subject = SUBJECT.to_string();

    let reset_token = service.create_signed_reset_token(SUBJECT);
    let signed_token = service.create_signed_token(&subject);
    let compact_token = service.create_payload_token(&subject).unwrap();
    let code_hash = service.hash_reset_code(CODE, SUBJECT);

    // The subject-bound check takes both reset tokens and compact tokens
    assert_eq!(accepted_by(&service, &reset_token), [true, false, true, false]);
    assert_eq!(accepted_by(&service, &signed_token), [false, true, false, false]);
    assert_eq!(accepted_by(&service, &compact_token), [false, false, true, false]);
    assert_eq!(accepted_by(&service, &code_hash), [false, false, false, true]);
}

#[test]
fn test_code_hash_does_not_verify_as_compact_token() {
    let (service, _) = service_with_clock();
    let stored = service.hash_reset_code(CODE, SUBJECT);
    let (subject, rest) = stored.split_once('.').unwrap();
    let (timestamp, hash) = rest.split_once('.').unwrap();

    // Same bytes the code hash was signed over, in compact form
    let converted = format!("{}-{}-{}.{}", subject, CODE, timestamp, hash);

    assert!(!service.verify_token_with_user_id(&converted, SUBJECT));
    assert!(!service.verify_token_with_user_id(&converted, 999));
}

#[test]
fn test_compact_signature_does_not_verify_as_code_hash() {
    let (service, _) = service_with_clock();
    let payload = format!("{}-654321-{}", SUBJECT, START_MILLIS);
    let token = service.create_payload_token(&payload).unwrap();
    let (_, signature) = token.rsplit_once('.').unwrap();

    let converted = format!("{}.{}.{}", SUBJECT, START_MILLIS, signature);

    assert!(!service.verify_reset_code("654321", &converted));
    // The genuine hash for the same code still verifies
    assert!(service.verify_reset_code("654321", &service.hash_reset_code("654321", SUBJECT)));
}
