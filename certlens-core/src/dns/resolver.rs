use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, instrument, warn};

use crate::error::{CertLensError, Result};

/// Default timeout for DNS queries (5 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves a host name to all of its addresses.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Returns every A and AAAA address for `host` in resolver order.
    async fn lookup_ips(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// DNS resolver used for fallback targets.
///
/// Uses the system resolver configuration when it can be read and falls
/// back to Google DNS otherwise. Every lookup is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    timeout: Duration,
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver {
    /// Creates a new DNS resolver with default settings.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout for a whole lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn create_resolver(&self) -> TokioAsyncResolver {
        let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(system) => system,
            Err(e) => {
                debug!(error = %e, "System resolver configuration unavailable, using Google DNS");
                (ResolverConfig::google(), ResolverOpts::default())
            }
        };

        opts.timeout = self.timeout;
        opts.attempts = 2;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        TokioAsyncResolver::tokio(config, opts)
    }
}

#[async_trait]
impl AddressResolver for DnsResolver {
    #[instrument(skip(self))]
    async fn lookup_ips(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let resolver = self.create_resolver();

        let response = tokio::time::timeout(self.timeout, resolver.lookup_ip(host))
            .await
            .map_err(|_| {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "DNS lookup timed out");
                CertLensError::Timeout(format!("DNS lookup for {} timed out", host))
            })??;

        let ips: Vec<IpAddr> = response.iter().collect();
        debug!(count = ips.len(), "Resolved addresses");

        if ips.is_empty() {
            return Err(CertLensError::ResolutionError(format!(
                "no addresses found for {}",
                host
            )));
        }

        Ok(ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literal_skips_dns() {
        let resolver = DnsResolver::new().with_timeout(Duration::from_millis(100));

        let ips = resolver.lookup_ips("192.0.2.10").await.unwrap();
        assert_eq!(ips, vec!["192.0.2.10".parse::<IpAddr>().unwrap()]);

        let ips = resolver.lookup_ips("[2001:db8::1]").await.unwrap();
        assert_eq!(ips, vec!["2001:db8::1".parse::<IpAddr>().unwrap()]);
    }
}
