use std::net::IpAddr;

use tracing::{debug, warn};

use super::resolver::AddressResolver;

/// Ordered list of alternate connect addresses for `host`.
///
/// An explicit fallback address wins outright and DNS is not consulted.
/// Otherwise, when `allow_dns` is set, every resolved address is returned
/// with IPv4 before IPv6, each group in resolver order. Resolution failures
/// yield an empty list.
pub async fn resolve_fallback_targets(
    resolver: &dyn AddressResolver,
    host: &str,
    fallback_ip: Option<&str>,
    allow_dns: bool,
) -> Vec<String> {
    if let Some(ip) = fallback_ip.map(str::trim).filter(|ip| !ip.is_empty()) {
        return vec![ip.to_string()];
    }

    if !allow_dns {
        return Vec::new();
    }

    match resolver.lookup_ips(host).await {
        Ok(addresses) => {
            let (v4, v6): (Vec<IpAddr>, Vec<IpAddr>) =
                addresses.into_iter().partition(|ip| ip.is_ipv4());
            debug!(host, ipv4 = v4.len(), ipv6 = v6.len(), "Resolved fallback targets");
            v4.into_iter().chain(v6).map(|ip| ip.to_string()).collect()
        }
        Err(e) => {
            warn!(host, error = %e, "Failed to resolve fallback addresses");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubResolver;

    #[tokio::test]
    async fn test_explicit_ip_skips_dns() {
        let resolver = StubResolver::new(&["192.0.2.1"]);
        let targets =
            resolve_fallback_targets(&resolver, "example.com", Some("  203.0.113.9 "), true).await;
        assert_eq!(targets, vec!["203.0.113.9"]);
        assert_eq!(resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_ip_with_dns_disabled_is_empty() {
        let resolver = StubResolver::new(&["192.0.2.1"]);
        let targets = resolve_fallback_targets(&resolver, "example.com", Some("   "), false).await;
        assert!(targets.is_empty());
        assert_eq!(resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ipv4_before_ipv6_preserving_order() {
        let resolver = StubResolver::new(&["2001:db8::2", "192.0.2.7", "2001:db8::1", "192.0.2.3"]);
        let targets = resolve_fallback_targets(&resolver, "example.com", None, true).await;
        assert_eq!(
            targets,
            vec!["192.0.2.7", "192.0.2.3", "2001:db8::2", "2001:db8::1"]
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_is_empty() {
        let resolver = StubResolver::failing();
        let targets = resolve_fallback_targets(&resolver, "missing.example", None, true).await;
        assert!(targets.is_empty());
        assert_eq!(resolver.call_count(), 1);
    }
}
