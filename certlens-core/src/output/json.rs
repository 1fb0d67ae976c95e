use super::OutputFormatter;
use crate::bulk::BulkCheckResult;
use crate::check::CheckReport;

pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }
}

impl OutputFormatter for JsonFormatter {
    /// Only the result contract is emitted; certificate details stay in
    /// the human view.
    fn format_check(&self, report: &CheckReport) -> String {
        self.to_json(&report.result)
    }

    fn format_bulk(&self, results: &[BulkCheckResult]) -> String {
        self.to_json(results)
    }
}
