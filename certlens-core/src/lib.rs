pub mod bulk;
pub mod check;
pub mod clock;
pub mod colors;
pub mod config;
pub mod dns;
pub mod error;
pub mod expiry;
pub mod output;
pub mod tls;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use error::{CertLensError, Result};
pub use validation::{normalize_host, validate_port};

pub use check::{CertChecker, CheckReport, CheckResult, CheckStatus, CheckTarget, DEFAULT_PORT};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CheckerConfig;
pub use dns::{AddressResolver, DnsResolver};
pub use expiry::{evaluate, ExpiryEvaluation};
pub use tls::{is_likely_intercepted, Handshaker, LeafCertificate, NativeTlsHandshaker, TrustPolicy};

pub use bulk::{parse_bulk_items_from_file, BulkCheckResult, BulkExecutor, BulkItem, ProgressCallback};
pub use output::{get_formatter, OutputFormat, OutputFormatter};
