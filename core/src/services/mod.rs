//! Business services containing domain logic.

pub mod signing;

pub use signing::{Clock, SignedTokenConfig, SignedTokenService, SystemClock};
