//! # Reeldiary Core
//!
//! Core domain layer for the Reeldiary backend: the wire shapes of password
//! reset tokens, generic signed tokens and numeric reset codes, the service
//! that issues and verifies them, and the domain error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
