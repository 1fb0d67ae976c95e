use serde::{Deserialize, Serialize};

use crate::check::{CheckResult, DEFAULT_PORT};
use crate::error::{CertLensError, Result};

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// One entry of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub client_name: String,
    /// Known address of the endpoint, used as the explicit fallback target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    pub client_domain: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl BulkItem {
    pub fn new(client_name: impl Into<String>, client_domain: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            client_ip: None,
            client_domain: client_domain.into(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }
}

/// A bulk item's client fields merged with its check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCheckResult {
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    pub client_domain: String,
    #[serde(flatten)]
    pub result: CheckResult,
}

impl BulkCheckResult {
    pub fn new(item: &BulkItem, result: CheckResult) -> Self {
        Self {
            client_name: item.client_name.clone(),
            client_ip: item.client_ip.clone(),
            client_domain: item.client_domain.clone(),
            result,
        }
    }
}

/// Parse bulk items from file content.
///
/// Accepts either a JSON array of items, or one item per line:
/// `domain`, `name,domain`, `name,domain,port` or `name,domain,port,ip`.
/// Blank lines and lines starting with `#` are skipped.
///
/// Every item must have a non-blank name and domain and a non-zero port.
pub fn parse_bulk_items_from_file(content: &str) -> Result<Vec<BulkItem>> {
    let items = if content.trim_start().starts_with('[') {
        serde_json::from_str(content)?
    } else {
        parse_lines(content)?
    };

    for (index, item) in items.iter().enumerate() {
        validate_item(item).map_err(|reason| {
            CertLensError::InvalidBulkInput(format!("item {}: {}", index + 1, reason))
        })?;
    }

    Ok(items)
}

fn validate_item(item: &BulkItem) -> std::result::Result<(), &'static str> {
    if item.client_domain.trim().is_empty() {
        return Err("client_domain must not be blank");
    }
    if item.client_name.trim().is_empty() {
        return Err("client_name must not be blank");
    }
    if item.port == 0 {
        return Err("port must be between 1 and 65535");
    }
    Ok(())
}

fn parse_lines(content: &str) -> Result<Vec<BulkItem>> {
    let mut items = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let item = match fields.as_slice() {
            [domain] => BulkItem::new(*domain, *domain),
            [name, domain] => BulkItem::new(*name, *domain),
            [name, domain, port] => BulkItem::new(*name, *domain).with_port(parse_port(port, number)?),
            [name, domain, port, ip] => {
                let item = BulkItem::new(*name, *domain).with_port(parse_port(port, number)?);
                if ip.is_empty() {
                    item
                } else {
                    item.with_ip(*ip)
                }
            }
            _ => {
                return Err(CertLensError::InvalidBulkInput(format!(
                    "line {}: expected at most 4 fields, got {}",
                    number + 1,
                    fields.len()
                )))
            }
        };
        items.push(item);
    }

    Ok(items)
}

fn parse_port(value: &str, line: usize) -> Result<u16> {
    if value.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CertLensError::InvalidBulkInput(format!(
            "line {}: invalid port '{}'",
            line + 1,
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let content = r#"
# fleet
example.com
Shop, shop.example.com
Mail, mail.example.com, 993
Edge, edge.example.com, 8443, 203.0.113.4
Legacy, legacy.example.com, ,
"#;

        let items = parse_bulk_items_from_file(content).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], BulkItem::new("example.com", "example.com"));
        assert_eq!(items[1], BulkItem::new("Shop", "shop.example.com"));
        assert_eq!(items[2].port, 993);
        assert_eq!(items[3].client_ip.as_deref(), Some("203.0.113.4"));
        assert_eq!(items[3].port, 8443);
        assert_eq!(items[4].port, 443);
        assert!(items[4].client_ip.is_none());
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"client_name": "Shop", "client_domain": "shop.example.com"},
            {"client_name": "Edge", "client_ip": "203.0.113.4", "client_domain": "edge.example.com", "port": 8443}
        ]"#;

        let items = parse_bulk_items_from_file(content).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].port, 443);
        assert_eq!(items[1], BulkItem::new("Edge", "edge.example.com").with_port(8443).with_ip("203.0.113.4"));
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        let err = parse_bulk_items_from_file("Shop, shop.example.com, 70000").unwrap_err();
        assert!(matches!(err, CertLensError::InvalidBulkInput(msg) if msg.contains("line 1")));
    }

    #[test]
    fn test_parse_rejects_missing_domain() {
        let err = parse_bulk_items_from_file("# fleet\nShop, shop.example.com\nMail, ").unwrap_err();
        assert!(matches!(err, CertLensError::InvalidBulkInput(msg) if msg.contains("item 2")));
    }

    #[test]
    fn test_parse_json_rejects_invalid_items() {
        let cases = [
            (r#"[{"client_name": "", "client_domain": "  ", "port": 0}]"#, "item 1"),
            (r#"[{"client_name": "Shop", "client_domain": "shop.example.com"},
                 {"client_name": "Edge", "client_domain": "  "}]"#, "item 2"),
            (r#"[{"client_name": " ", "client_domain": "shop.example.com"}]"#, "client_name"),
            (r#"[{"client_name": "Shop", "client_domain": "shop.example.com", "port": 0}]"#, "port"),
        ];

        for (content, expected) in cases {
            match parse_bulk_items_from_file(content) {
                Err(CertLensError::InvalidBulkInput(msg)) => {
                    assert!(msg.contains(expected), "{} did not mention {}", msg, expected)
                }
                other => panic!("expected InvalidBulkInput for {}, got {:?}", content, other),
            }
        }
    }

    #[test]
    fn test_bulk_result_flattens_check_fields() {
        let item = BulkItem::new("Shop", "shop.example.com").with_ip("203.0.113.4");
        let result = CheckResult::error("shop.example.com", 443, "Timed out", chrono::Utc::now());

        let json = serde_json::to_value(BulkCheckResult::new(&item, result)).unwrap();
        assert_eq!(json["client_name"], "Shop");
        assert_eq!(json["client_ip"], "203.0.113.4");
        assert_eq!(json["client_domain"], "shop.example.com");
        assert_eq!(json["host"], "shop.example.com");
        assert_eq!(json["status"], "ERROR");
        assert_eq!(json["errorMessage"], "Timed out");
    }
}
