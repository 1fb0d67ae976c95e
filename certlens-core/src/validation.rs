//! Host and port validation for user-supplied check targets

use std::net::IpAddr;

use crate::error::{CertLensError, Result};

/// Longest DNS name accepted, in characters
const MAX_HOST_LEN: usize = 253;

/// Normalize and validate a host to check
///
/// This function:
/// - Trims surrounding whitespace
/// - Removes http:// and https:// prefixes
/// - Removes trailing slashes and paths
/// - Converts to lowercase
/// - Accepts IP literals, including bracketed IPv6
/// - Otherwise requires a name of alphanumerics, hyphens, underscores and dots
pub fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().to_lowercase();

    let host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(&host);

    let host = host.split('/').next().unwrap_or(host);

    if host.is_empty() {
        return Err(CertLensError::InvalidHost("host must not be blank".to_string()));
    }

    let unbracketed = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return Ok(ip.to_string());
    }

    if host.len() > MAX_HOST_LEN {
        return Err(CertLensError::InvalidHost(format!(
            "host is longer than {} characters",
            MAX_HOST_LEN
        )));
    }

    let valid = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if !valid {
        return Err(CertLensError::InvalidHost(host.to_string()));
    }

    // Check for consecutive dots or dots at start/end
    if host.contains("..") || host.starts_with('.') || host.ends_with('.') {
        return Err(CertLensError::InvalidHost(host.to_string()));
    }

    for label in host.split('.') {
        if label.starts_with('-') || label.ends_with('-') {
            return Err(CertLensError::InvalidHost(host.to_string()));
        }
    }

    Ok(host.to_string())
}

/// Validate a TCP port (1-65535)
pub fn validate_port(port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CertLensError::InvalidPort(format!(
            "{} is outside 1-65535",
            port
        ))),
    }
}
