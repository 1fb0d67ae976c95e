//! Single-endpoint certificate checks
//!
//! A check performs a default-trust handshake, retries with a permissive
//! trust policy on failure, and classifies the leaf's expiry. The fallback
//! variant re-routes through alternate addresses when the certificate looks
//! like it came from an intercepting middlebox.

mod client;
mod types;

pub use client::{CertChecker, CheckReport};
pub use types::{CheckResult, CheckStatus, CheckTarget, DEFAULT_PORT};
