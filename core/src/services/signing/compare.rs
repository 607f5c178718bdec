//! Constant-time comparison of signatures and hashes

use constant_time_eq::constant_time_eq_32;
use sha2::{Digest, Sha256};

/// Compare two strings without leaking where, or whether, they differ.
///
/// Both sides are hashed to fixed 32-byte digests first, so inputs of
/// different lengths never reach the fixed-length comparator and a length
/// mismatch costs the same as a content mismatch.
pub fn secure_compare(expected: &str, provided: &str) -> bool {
    let expected: [u8; 32] = Sha256::digest(expected.as_bytes()).into();
    let provided: [u8; 32] = Sha256::digest(provided.as_bytes()).into();
    constant_time_eq_32(&expected, &provided)
}
