use std::time::Duration;

use async_trait::async_trait;
use native_tls::TlsConnector;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

use super::certificate::LeafCertificate;
use crate::check::CheckTarget;
use crate::config::CheckerConfig;
use crate::error::{CertLensError, Result};

/// Which roots a handshake trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustPolicy {
    /// Platform trust store; the chain must validate.
    Default,
    /// Accept any chain. Only used to retrieve a certificate for inspection.
    Permissive,
}

/// Result of one successful handshake.
#[derive(Debug, Clone)]
pub struct HandshakeOutcome {
    pub leaf: LeafCertificate,
    /// True when the handshake succeeded under [`TrustPolicy::Default`].
    pub chain_trusted: bool,
}

/// Performs a single TLS handshake against a target and returns the leaf.
#[async_trait]
pub trait Handshaker: Send + Sync {
    async fn handshake(&self, target: &CheckTarget, policy: TrustPolicy) -> Result<HandshakeOutcome>;
}

/// Handshaker backed by the platform TLS library.
#[derive(Clone)]
pub struct NativeTlsHandshaker {
    connect_timeout: Duration,
    read_timeout: Duration,
    strict: tokio_native_tls::TlsConnector,
    permissive: tokio_native_tls::TlsConnector,
}

impl std::fmt::Debug for NativeTlsHandshaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeTlsHandshaker")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl NativeTlsHandshaker {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        // Chain trust only; the host name is not matched against the leaf.
        let strict = TlsConnector::builder()
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| CertLensError::HandshakeError(e.to_string()))?;

        let permissive = TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| CertLensError::HandshakeError(e.to_string()))?;

        Ok(Self {
            connect_timeout,
            read_timeout,
            strict: tokio_native_tls::TlsConnector::from(strict),
            permissive: tokio_native_tls::TlsConnector::from(permissive),
        })
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        Self::new(config.connect_timeout(), config.read_timeout())
    }

    fn connector(&self, policy: TrustPolicy) -> &tokio_native_tls::TlsConnector {
        match policy {
            TrustPolicy::Default => &self.strict,
            TrustPolicy::Permissive => &self.permissive,
        }
    }
}

#[async_trait]
impl Handshaker for NativeTlsHandshaker {
    #[instrument(skip(self, target), fields(host = %target.host, port = target.port, address = target.connect_host()))]
    async fn handshake(&self, target: &CheckTarget, policy: TrustPolicy) -> Result<HandshakeOutcome> {
        let address = target.connect_host();
        debug!(?policy, "Starting TLS handshake");

        let tcp = tokio::time::timeout(self.connect_timeout, TcpStream::connect((address, target.port)))
            .await
            .map_err(|_| {
                CertLensError::ConnectError(format!(
                    "connection to {}:{} timed out after {}ms",
                    address,
                    target.port,
                    self.connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| CertLensError::ConnectError(format!("{}:{}: {}", address, target.port, e)))?;

        // SNI carries the original host name, never the connect address.
        let tls_stream = tokio::time::timeout(
            self.read_timeout,
            self.connector(policy).connect(&target.host, tcp),
        )
        .await
        .map_err(|_| {
            CertLensError::HandshakeError(format!(
                "handshake with {} timed out after {}ms",
                target.host,
                self.read_timeout.as_millis()
            ))
        })?
        .map_err(|e| CertLensError::HandshakeError(e.to_string()))?;

        let cert = tls_stream
            .get_ref()
            .peer_certificate()
            .map_err(|e| CertLensError::NoCertificate(e.to_string()))?
            .ok_or_else(|| CertLensError::NoCertificate("peer presented no certificate".to_string()))?;

        let der = cert
            .to_der()
            .map_err(|e| CertLensError::NoCertificate(e.to_string()))?;

        let leaf = LeafCertificate::from_der(&der)?;
        debug!(subject = %leaf.subject, not_after = %leaf.not_after, "Handshake succeeded");

        Ok(HandshakeOutcome {
            leaf,
            chain_trusted: policy == TrustPolicy::Default,
        })
    }
}
