use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::types::{CheckResult, CheckTarget};
use crate::clock::{Clock, SystemClock};
use crate::config::CheckerConfig;
use crate::dns::{resolve_fallback_targets, AddressResolver, DnsResolver};
use crate::error::Result;
use crate::expiry;
use crate::tls::{is_likely_intercepted, Handshaker, LeafCertificate, NativeTlsHandshaker, TrustPolicy};

/// A check result together with the certificate it was computed from.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub result: CheckResult,
    /// Absent when the check errored
    pub certificate: Option<LeafCertificate>,
}

/// Checks the TLS certificate served by a host.
///
/// Each check tries the platform trust store first and, when that handshake
/// fails for any reason, retries once with a permissive policy so that the
/// certificate can still be inspected. `chain_trusted` records which of the
/// two succeeded.
#[derive(Clone)]
pub struct CertChecker {
    handshaker: Arc<dyn Handshaker>,
    resolver: Arc<dyn AddressResolver>,
    clock: Arc<dyn Clock>,
    expiring_days: u32,
}

impl std::fmt::Debug for CertChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertChecker")
            .field("expiring_days", &self.expiring_days)
            .finish_non_exhaustive()
    }
}

impl CertChecker {
    /// Create a checker with default settings
    pub fn new() -> Result<Self> {
        Self::from_config(&CheckerConfig::default())
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        Ok(Self {
            handshaker: Arc::new(NativeTlsHandshaker::from_config(config)?),
            resolver: Arc::new(DnsResolver::new().with_timeout(config.dns_timeout())),
            clock: Arc::new(SystemClock),
            expiring_days: config.expiring_days,
        })
    }

    pub fn with_handshaker(mut self, handshaker: Arc<dyn Handshaker>) -> Self {
        self.handshaker = handshaker;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn AddressResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_expiring_days(mut self, days: u32) -> Self {
        self.expiring_days = days;
        self
    }

    pub fn expiring_days(&self) -> u32 {
        self.expiring_days
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Check the certificate served on `host:port`.
    pub async fn check(&self, host: &str, port: u16) -> CheckResult {
        self.inspect(host, port).await.result
    }

    /// Like [`check`](Self::check), but when the certificate looks like it was
    /// issued by an intercepting middlebox, retry against alternate addresses
    /// and return the first non-error result.
    ///
    /// `fallback_ip` takes precedence over DNS; `resolve_dns_if_no_ip` allows
    /// resolving `host` when no explicit address is given. If every fallback
    /// attempt errors, the primary result is returned.
    pub async fn check_with_fallback(
        &self,
        host: &str,
        port: u16,
        fallback_ip: Option<&str>,
        resolve_dns_if_no_ip: bool,
    ) -> CheckResult {
        self.inspect_with_fallback(host, port, fallback_ip, resolve_dns_if_no_ip)
            .await
            .result
    }

    /// [`check`](Self::check), keeping the parsed leaf certificate.
    pub async fn inspect(&self, host: &str, port: u16) -> CheckReport {
        self.check_target(&CheckTarget::new(host, port)).await
    }

    /// [`check_with_fallback`](Self::check_with_fallback), keeping the parsed
    /// leaf certificate.
    #[instrument(skip(self))]
    pub async fn inspect_with_fallback(
        &self,
        host: &str,
        port: u16,
        fallback_ip: Option<&str>,
        resolve_dns_if_no_ip: bool,
    ) -> CheckReport {
        let primary = self.inspect(host, port).await;
        if primary.result.is_error() {
            return primary;
        }
        if !is_likely_intercepted(primary.certificate.as_ref()) {
            return primary;
        }

        info!("Certificate looks intercepted, trying fallback targets");
        let targets =
            resolve_fallback_targets(self.resolver.as_ref(), host, fallback_ip, resolve_dns_if_no_ip)
                .await;

        for address in targets {
            let target = CheckTarget::new(host, port).with_connect_address(address);
            let fallback = self.check_target(&target).await;
            if !fallback.result.is_error() {
                debug!(address = target.connect_host(), "Fallback target succeeded");
                return fallback;
            }
            debug!(address = target.connect_host(), "Fallback target failed");
        }

        primary
    }

    #[instrument(skip(self, target), fields(host = %target.host, port = target.port))]
    async fn check_target(&self, target: &CheckTarget) -> CheckReport {
        let checked_at = self.clock.now();

        let outcome = match self.handshaker.handshake(target, TrustPolicy::Default).await {
            Ok(outcome) => outcome,
            Err(first) => {
                warn!(error = %first, "TLS handshake failed with default trust");
                match self.handshaker.handshake(target, TrustPolicy::Permissive).await {
                    Ok(outcome) => outcome,
                    Err(second) => {
                        let message = second.check_message();
                        warn!(error = %message, "TLS handshake failed");
                        return CheckReport {
                            result: CheckResult::error(&target.host, target.port, message, checked_at),
                            certificate: None,
                        };
                    }
                }
            }
        };

        let not_after = outcome.leaf.not_after;
        let evaluation = expiry::evaluate(not_after, checked_at, self.expiring_days);

        CheckReport {
            result: CheckResult::valid(
                &target.host,
                target.port,
                not_after,
                evaluation,
                outcome.chain_trusted,
                checked_at,
            ),
            certificate: Some(outcome.leaf),
        }
    }
}
