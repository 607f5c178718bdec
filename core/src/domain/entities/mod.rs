//! Domain entities: the wire shapes of reset tokens, signed tokens and reset codes.

pub mod reset_code;
pub mod reset_token;
pub mod signed_token;

#[cfg(test)]
mod tests;

pub use reset_code::{
    ResetCode, ResetCodeHash, DEFAULT_RESET_CODE_TTL_MILLIS, RESET_CODE_LENGTH,
};
pub use reset_token::{ResetToken, ResetTokenVerification, NONCE_BYTES};
pub use signed_token::{PayloadToken, SubjectToken};
