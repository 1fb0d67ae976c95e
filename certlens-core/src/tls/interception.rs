use super::certificate::LeafCertificate;

/// Lowercase substrings that identify certificates re-issued by known
/// TLS-intercepting middleboxes. This is a heuristic, not a security check.
const MIDDLEBOX_MARKERS: &[&str] = &["fortinet", "blocked page"];

/// Whether `certificate` looks like it was minted by an intercepting
/// middlebox rather than the origin server.
pub fn is_likely_intercepted(certificate: Option<&LeafCertificate>) -> bool {
    let Some(cert) = certificate else {
        return false;
    };

    let haystack = format!("{} {}", cert.subject, cert.issuer).to_lowercase();
    MIDDLEBOX_MARKERS
        .iter()
        .any(|marker| haystack.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cert(subject: &str, issuer: &str) -> LeafCertificate {
        LeafCertificate {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            not_before: Utc::now(),
            not_after: Utc::now(),
            dns_names: Vec::new(),
        }
    }

    #[test]
    fn test_absent_certificate_is_not_intercepted() {
        assert!(!is_likely_intercepted(None));
    }

    #[test]
    fn test_fortinet_issuer_is_intercepted() {
        let c = cert("CN=example.com", "CN=FortiGate CA, O=Fortinet, C=US");
        assert!(is_likely_intercepted(Some(&c)));
    }

    #[test]
    fn test_blocked_page_subject_is_intercepted() {
        let c = cert("CN=Blocked Page, O=Corp Proxy", "CN=Corp Root");
        assert!(is_likely_intercepted(Some(&c)));
    }

    #[test]
    fn test_ordinary_certificate_is_not_intercepted() {
        let c = cert("CN=example.com", "CN=R11, O=Let's Encrypt, C=US");
        assert!(!is_likely_intercepted(Some(&c)));
    }
}
