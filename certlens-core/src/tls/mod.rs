//! TLS handshakes and leaf certificate inspection
//!
//! - [`Handshaker`]: one handshake under an explicit [`TrustPolicy`]
//! - [`LeafCertificate`]: parsed end-entity certificate
//! - [`is_likely_intercepted`]: middlebox detection heuristic

mod certificate;
mod handshake;
mod interception;

pub use certificate::LeafCertificate;
pub use handshake::{HandshakeOutcome, Handshaker, NativeTlsHandshaker, TrustPolicy};
pub use interception::is_likely_intercepted;
