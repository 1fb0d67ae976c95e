use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertLensError {
    #[error("Connection failed: {0}")]
    ConnectError(String),

    #[error("TLS handshake failed: {0}")]
    HandshakeError(String),

    #[error("No usable certificate: {0}")]
    NoCertificate(String),

    #[error("DNS resolution failed: {0}")]
    ResolutionError(String),

    #[error("DNS resolver error: {0}")]
    DnsResolverError(#[from] hickory_resolver::error::ResolveError),

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid bulk input: {0}")]
    InvalidBulkInput(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing failed: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl CertLensError {
    /// Short category label, used as the prefix of ERROR result messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CertLensError::ConnectError(_) => "ConnectError",
            CertLensError::HandshakeError(_) => "HandshakeError",
            CertLensError::NoCertificate(_) => "NoCertificateError",
            CertLensError::ResolutionError(_) | CertLensError::DnsResolverError(_) => {
                "ResolutionError"
            }
            CertLensError::InvalidHost(_) => "InvalidHost",
            CertLensError::InvalidPort(_) => "InvalidPort",
            CertLensError::InvalidBulkInput(_) => "InvalidBulkInput",
            CertLensError::ConfigError(_) => "ConfigError",
            CertLensError::Timeout(_) => "Timeout",
            CertLensError::Io(_) => "IoError",
            CertLensError::TomlError(_) => "TomlError",
            CertLensError::JsonError(_) => "JsonError",
            CertLensError::Other(_) => "Error",
        }
    }

    /// Detail text without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            CertLensError::ConnectError(msg)
            | CertLensError::HandshakeError(msg)
            | CertLensError::NoCertificate(msg)
            | CertLensError::ResolutionError(msg)
            | CertLensError::InvalidHost(msg)
            | CertLensError::InvalidPort(msg)
            | CertLensError::InvalidBulkInput(msg)
            | CertLensError::ConfigError(msg)
            | CertLensError::Timeout(msg)
            | CertLensError::Other(msg) => msg.clone(),
            CertLensError::DnsResolverError(e) => e.to_string(),
            CertLensError::Io(e) => e.to_string(),
            CertLensError::TomlError(e) => e.to_string(),
            CertLensError::JsonError(e) => e.to_string(),
        }
    }

    /// Message carried by an ERROR check result: `Kind: detail`, or just the
    /// kind when there is no detail text.
    pub fn check_message(&self) -> String {
        let detail = self.detail();
        let detail = detail.trim();
        if detail.is_empty() {
            self.kind().to_string()
        } else {
            format!("{}: {}", self.kind(), detail)
        }
    }
}

pub type Result<T> = std::result::Result<T, CertLensError>;
