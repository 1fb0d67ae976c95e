use colored::Colorize;

use super::OutputFormatter;
use crate::bulk::BulkCheckResult;
use crate::check::{CheckReport, CheckResult, CheckStatus};
use crate::colors::{status_colored, PaletteExt};

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.label().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.value().to_string()
        } else {
            text.to_string()
        }
    }

    fn status(&self, text: &str, status: CheckStatus) -> String {
        if self.use_colors {
            status_colored(text, status).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.caution().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_colors {
            text.muted().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!("\n{}\n{}", text.heading().bold(), "─".repeat(text.len()).muted())
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.len()))
        }
    }

    fn field(&self, name: &str, value: &str) -> String {
        format!("  {}: {}", self.label(name), self.value(value))
    }

    fn expiry_summary(&self, result: &CheckResult) -> String {
        let Some(expires_at) = result.expires_at else {
            return "-".to_string();
        };
        let date = expires_at.format("%Y-%m-%d %H:%M UTC").to_string();
        match result.status {
            CheckStatus::Expired => format!("{} (expired)", date),
            _ => format!("{} ({} days)", date, result.days_remaining),
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_check(&self, report: &CheckReport) -> String {
        let result = &report.result;
        let mut output = Vec::new();

        output.push(self.header(&format!("TLS: {}:{}", result.host, result.port)));
        output.push(format!(
            "  {}: {}",
            self.label("Status"),
            self.status(&result.status.to_string(), result.status)
        ));

        if let Some(ref message) = result.error_message {
            output.push(format!(
                "  {}: {}",
                self.label("Error"),
                self.status(message, CheckStatus::Error)
            ));
        }

        if result.expires_at.is_some() {
            output.push(format!(
                "  {}: {}",
                self.label("Expires"),
                self.status(&self.expiry_summary(result), result.status)
            ));
        }

        if let Some(trusted) = result.chain_trusted {
            let text = if trusted {
                self.value("trusted")
            } else {
                self.warning("not trusted (permissive retry)")
            };
            output.push(format!("  {}: {}", self.label("Chain"), text));
        }

        if let Some(ref cert) = report.certificate {
            output.push(self.field("Subject", &cert.subject));
            output.push(self.field("Issuer", &cert.issuer));
            output.push(self.field(
                "Valid From",
                &cert.not_before.format("%Y-%m-%d %H:%M UTC").to_string(),
            ));
            if !cert.dns_names.is_empty() {
                output.push(format!("  {}:", self.label("Names")));
                for name in &cert.dns_names {
                    output.push(format!("    - {}", self.value(name)));
                }
            }
        }

        output.push(format!(
            "  {}: {}",
            self.label("Checked"),
            self.muted(&result.checked_at.to_rfc3339())
        ));

        output.join("\n")
    }

    fn format_bulk(&self, results: &[BulkCheckResult]) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Bulk TLS check: {} targets", results.len())));

        let name_width = results
            .iter()
            .map(|r| r.client_name.len())
            .max()
            .unwrap_or(0)
            .max(6);
        let domain_width = results
            .iter()
            .map(|r| r.client_domain.trim().len() + 6)
            .max()
            .unwrap_or(0)
            .max(6);

        for entry in results {
            let result = &entry.result;
            let target = format!("{}:{}", entry.client_domain.trim(), result.port);
            let detail = match result.error_message {
                Some(ref message) => message.clone(),
                None => self.expiry_summary(result),
            };
            // Pad before coloring so escape codes do not skew the columns
            let status_text = format!("{:<8}", result.status.to_string());
            output.push(format!(
                "  {} {:<name_width$}  {:<domain_width$}  {}",
                self.status(&status_text, result.status),
                entry.client_name,
                target,
                self.muted(&detail),
                name_width = name_width,
                domain_width = domain_width,
            ));
        }

        let count = |status: CheckStatus| results.iter().filter(|r| r.result.status == status).count();
        output.push(String::new());
        output.push(format!(
            "  {} {}  {} {}  {} {}  {} {}",
            self.status("OK", CheckStatus::Ok),
            count(CheckStatus::Ok),
            self.status("EXPIRING", CheckStatus::Expiring),
            count(CheckStatus::Expiring),
            self.status("EXPIRED", CheckStatus::Expired),
            count(CheckStatus::Expired),
            self.status("ERROR", CheckStatus::Error),
            count(CheckStatus::Error),
        ));

        output.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::BulkItem;
    use crate::test_support::{fixed_now, leaf};
    use chrono::Duration;

    fn expiring_result() -> CheckResult {
        CheckResult {
            host: "example.com".to_string(),
            port: 443,
            expires_at: Some(fixed_now() + Duration::days(3)),
            days_remaining: 3,
            status: CheckStatus::Expiring,
            error_message: None,
            checked_at: fixed_now(),
            chain_trusted: Some(false),
        }
    }

    #[test]
    fn test_format_check_with_certificate() {
        let report = CheckReport {
            result: expiring_result(),
            certificate: Some(leaf(
                "CN=example.com",
                "CN=Example CA",
                fixed_now() + Duration::days(3),
            )),
        };

        let out = HumanFormatter::new().without_colors().format_check(&report);
        assert!(out.contains("TLS: example.com:443"));
        assert!(out.contains("Status: EXPIRING"));
        assert!(out.contains("(3 days)"));
        assert!(out.contains("not trusted"));
        assert!(out.contains("Subject: CN=example.com"));
        assert!(out.contains("Issuer: CN=Example CA"));
    }

    #[test]
    fn test_format_check_error() {
        let report = CheckReport {
            result: CheckResult::error("example.com", 8443, "ConnectError: refused", fixed_now()),
            certificate: None,
        };

        let out = HumanFormatter::new().without_colors().format_check(&report);
        assert!(out.contains("Status: ERROR"));
        assert!(out.contains("Error: ConnectError: refused"));
        assert!(!out.contains("Expires"));
        assert!(!out.contains("Chain"));
    }

    #[test]
    fn test_format_bulk_rows_and_totals() {
        let ok = BulkCheckResult::new(
            &BulkItem::new("acme", "example.com"),
            expiring_result(),
        );
        let failed = BulkCheckResult::new(
            &BulkItem::new("globex", " broken.example "),
            CheckResult::error("broken.example", 443, "Timed out while performing SSL check", fixed_now()),
        );

        let out = HumanFormatter::new()
            .without_colors()
            .format_bulk(&[ok, failed]);
        assert!(out.contains("2 targets"));
        assert!(out.contains("acme"));
        assert!(out.contains("broken.example:443"));
        assert!(out.contains("Timed out while performing SSL check"));
        assert!(out.contains("EXPIRING 1"));
        assert!(out.contains("ERROR 1"));
        assert!(out.contains("OK 0"));
    }
}
