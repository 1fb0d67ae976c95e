use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use x509_parser::prelude::*;

use crate::error::{CertLensError, Result};

/// The end-entity certificate presented by a TLS peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafCertificate {
    /// Subject distinguished name, e.g. `CN=example.com, O=Example`
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// DNS names from the subjectAltName extension
    pub dns_names: Vec<String>,
}

impl LeafCertificate {
    /// Parse a DER-encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der).map_err(|e| {
            CertLensError::NoCertificate(format!("leaf is not a valid X.509 certificate: {}", e))
        })?;

        let not_before = asn1_to_utc(&cert.validity().not_before)?;
        let not_after = asn1_to_utc(&cert.validity().not_after)?;

        let dns_names = cert
            .subject_alternative_name()
            .ok()
            .flatten()
            .map(|san| {
                san.value
                    .general_names
                    .iter()
                    .filter_map(|name| match name {
                        GeneralName::DNSName(dns) => Some(dns.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_before,
            not_after,
            dns_names,
        })
    }
}

fn asn1_to_utc(time: &ASN1Time) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0).ok_or_else(|| {
        CertLensError::NoCertificate(format!("certificate validity out of range: {}", time))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_not_a_certificate() {
        let err = LeafCertificate::from_der(&[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap_err();
        assert!(matches!(err, CertLensError::NoCertificate(_)));
    }

    #[test]
    fn test_empty_input_is_not_a_certificate() {
        assert!(matches!(
            LeafCertificate::from_der(&[]),
            Err(CertLensError::NoCertificate(_))
        ));
    }
}
