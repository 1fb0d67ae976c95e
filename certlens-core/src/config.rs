//! Checker configuration.
//!
//! Values can come from a TOML file, from the builder methods, or both. Every
//! field has a default, so an empty file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CertLensError, Result};

const MIN_TIMEOUT_MS: u64 = 100;

/// Tunables for single and bulk certificate checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckerConfig {
    /// TCP connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Bound on all I/O after the connection is established, in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// A certificate with this many days or fewer left is reported as EXPIRING.
    #[serde(default = "default_expiring_days")]
    pub expiring_days: u32,
    /// Maximum number of checks running at once during a bulk run.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
    /// Overall deadline for a bulk run, in milliseconds.
    #[serde(default = "default_bulk_timeout_ms")]
    pub bulk_timeout_ms: u64,
    /// Bound on fallback DNS resolution, in milliseconds.
    #[serde(default = "default_dns_timeout_ms")]
    pub dns_timeout_ms: u64,
    /// Largest accepted bulk batch.
    #[serde(default = "default_max_bulk_items")]
    pub max_bulk_items: usize,
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_read_timeout_ms() -> u64 {
    7_000
}

fn default_expiring_days() -> u32 {
    7
}

fn default_bulk_concurrency() -> usize {
    16
}

fn default_bulk_timeout_ms() -> u64 {
    180_000
}

fn default_dns_timeout_ms() -> u64 {
    5_000
}

fn default_max_bulk_items() -> usize {
    300
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            expiring_days: default_expiring_days(),
            bulk_concurrency: default_bulk_concurrency(),
            bulk_timeout_ms: default_bulk_timeout_ms(),
            dns_timeout_ms: default_dns_timeout_ms(),
            max_bulk_items: default_max_bulk_items(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values below their documented minimums.
    pub fn validate(&self) -> Result<()> {
        check_min("connect_timeout_ms", self.connect_timeout_ms, MIN_TIMEOUT_MS)?;
        check_min("read_timeout_ms", self.read_timeout_ms, MIN_TIMEOUT_MS)?;
        check_min("expiring_days", u64::from(self.expiring_days), 1)?;
        check_min("bulk_concurrency", self.bulk_concurrency as u64, 1)?;
        check_min("bulk_timeout_ms", self.bulk_timeout_ms, MIN_TIMEOUT_MS)?;
        check_min("dns_timeout_ms", self.dns_timeout_ms, MIN_TIMEOUT_MS)?;
        check_min("max_bulk_items", self.max_bulk_items as u64, 1)?;
        Ok(())
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_expiring_days(mut self, days: u32) -> Self {
        self.expiring_days = days;
        self
    }

    pub fn with_bulk_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_concurrency = concurrency;
        self
    }

    pub fn with_bulk_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_bulk_items(mut self, max: usize) -> Self {
        self.max_bulk_items = max;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_millis(self.bulk_timeout_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }
}

fn check_min(field: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(CertLensError::ConfigError(format!(
            "{} must be at least {} (got {})",
            field, min, value
        )));
    }
    Ok(())
}
