//! Network-free doubles for the handshake and DNS seams.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::check::CheckTarget;
use crate::dns::AddressResolver;
use crate::error::{CertLensError, Result};
use crate::tls::{HandshakeOutcome, Handshaker, LeafCertificate, TrustPolicy};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn leaf(subject: &str, issuer: &str, not_after: DateTime<Utc>) -> LeafCertificate {
    LeafCertificate {
        subject: subject.to_string(),
        issuer: issuer.to_string(),
        not_before: not_after - chrono::Duration::days(90),
        not_after,
        dns_names: Vec::new(),
    }
}

/// One recorded handshake attempt: (connect address, SNI host, policy).
pub type HandshakeCall = (String, String, TrustPolicy);

/// Answers handshakes from a table keyed by connect address and policy.
/// Unknown keys fail with a connect error.
#[derive(Default)]
pub struct StubHandshaker {
    responses: HashMap<(String, TrustPolicy), std::result::Result<LeafCertificate, String>>,
    delays: HashMap<String, Duration>,
    panics: Vec<String>,
    calls: Mutex<Vec<HandshakeCall>>,
}

impl StubHandshaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(mut self, address: &str, policy: TrustPolicy, leaf: LeafCertificate) -> Self {
        self.responses.insert((address.to_string(), policy), Ok(leaf));
        self
    }

    pub fn fail(mut self, address: &str, policy: TrustPolicy, message: &str) -> Self {
        self.responses
            .insert((address.to_string(), policy), Err(message.to_string()));
        self
    }

    pub fn delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, address: &str) -> Self {
        self.panics.push(address.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HandshakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Handshaker for StubHandshaker {
    async fn handshake(&self, target: &CheckTarget, policy: TrustPolicy) -> Result<HandshakeOutcome> {
        let address = target.connect_host().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((address.clone(), target.host.clone(), policy));

        if let Some(delay) = self.delays.get(&address) {
            tokio::time::sleep(*delay).await;
        }
        if self.panics.contains(&address) {
            panic!("stub handshaker asked to panic for {}", address);
        }

        match self.responses.get(&(address.clone(), policy)) {
            Some(Ok(leaf)) => Ok(HandshakeOutcome {
                leaf: leaf.clone(),
                chain_trusted: policy == TrustPolicy::Default,
            }),
            Some(Err(message)) => Err(CertLensError::HandshakeError(message.clone())),
            None => Err(CertLensError::ConnectError(format!(
                "{}:{}: connection refused",
                address, target.port
            ))),
        }
    }
}

/// Resolver returning a fixed answer, or failing, and counting lookups.
pub struct StubResolver {
    answer: Option<Vec<IpAddr>>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn new(answer: &[&str]) -> Self {
        Self {
            answer: Some(answer.iter().map(|ip| ip.parse().unwrap()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every lookup fails with a resolution error.
    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for StubResolver {
    async fn lookup_ips(&self, host: &str) -> Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| CertLensError::ResolutionError(format!("NXDOMAIN {}", host)))
    }
}
