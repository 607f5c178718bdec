//! Signed token service
//!
//! Stateless HMAC-SHA256 tokens for password reset flows:
//! - Reset tokens binding an account id to a nonce and timestamp
//! - Generic signed tokens binding an opaque payload
//! - Six digit reset codes with a separately signed, expiring hash
//!
//! Every signature comparison is constant-time.

mod clock;
mod compare;
mod config;
mod keys;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, SystemClock};
pub use compare::secure_compare;
pub use config::SignedTokenConfig;
pub use keys::{SigningKeys, TokenFamily};
pub use service::SignedTokenService;
