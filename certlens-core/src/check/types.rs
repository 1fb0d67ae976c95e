use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::expiry::ExpiryEvaluation;

/// Default TLS port
pub const DEFAULT_PORT: u16 = 443;

/// Where to connect for one handshake attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    /// Host name sent as SNI and reported in results
    pub host: String,
    pub port: u16,
    /// Address to open the TCP connection to instead of `host`
    pub connect_address: Option<String>,
}

impl CheckTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_address: None,
        }
    }

    pub fn with_connect_address(mut self, address: impl Into<String>) -> Self {
        self.connect_address = Some(address.into());
        self
    }

    /// The address the TCP connection is opened to: the override when it is
    /// non-blank, otherwise the host. IPv6 brackets are stripped.
    pub fn connect_host(&self) -> &str {
        let address = self
            .connect_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.host);
        address.trim_start_matches('[').trim_end_matches(']')
    }
}

/// Certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Expiring,
    Expired,
    Error,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Expiring => "EXPIRING",
            CheckStatus::Expired => "EXPIRED",
            CheckStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Result of checking one endpoint.
///
/// `status` is [`CheckStatus::Error`] exactly when `expires_at` is absent and
/// `error_message` is present. `days_remaining` is 0 for expired and errored
/// results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub days_remaining: u32,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_trusted: Option<bool>,
}

impl CheckResult {
    /// A successful result built from an expiry evaluation.
    pub fn valid(
        host: impl Into<String>,
        port: u16,
        expires_at: DateTime<Utc>,
        evaluation: ExpiryEvaluation,
        chain_trusted: bool,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            expires_at: Some(expires_at),
            days_remaining: evaluation.days_remaining,
            status: evaluation.status,
            error_message: None,
            checked_at,
            chain_trusted: Some(chain_trusted),
        }
    }

    pub fn error(
        host: impl Into<String>,
        port: u16,
        message: impl Into<String>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            expires_at: None,
            days_remaining: 0,
            status: CheckStatus::Error,
            error_message: Some(message.into()),
            checked_at,
            chain_trusted: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CheckStatus::Error
    }
}
