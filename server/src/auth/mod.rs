//! Authentication module.
//!
//! Token issuing and verification on top of the configured key material.
//!
//! # Pre-conditions
//! - The configuration must reference valid RSA key files.
//!
//! # Invariants
//! - Every token is RS256 (`configuration::JWT_ALGORITHM`).

pub mod jwt;

pub use jwt::{
    Claims, JwtError, issue_token, verify_api_server_token, verify_own_token, verify_token,
};
