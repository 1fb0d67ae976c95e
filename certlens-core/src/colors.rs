//! Terminal palette for certificate status output.
//!
//! Uses standard ANSI bright colors for maximum terminal compatibility.

use colored::{ColoredString, Colorize};

use crate::check::CheckStatus;

/// Extension trait for applying the status palette to strings.
pub trait PaletteExt {
    /// Healthy values (OK)
    fn healthy(&self) -> ColoredString;
    /// Values needing attention soon (EXPIRING, untrusted chain)
    fn caution(&self) -> ColoredString;
    /// Failures (EXPIRED, ERROR)
    fn danger(&self) -> ColoredString;
    /// Field labels
    fn label(&self) -> ColoredString;
    /// Section headings
    fn heading(&self) -> ColoredString;
    /// Secondary text such as rules and timestamps
    fn muted(&self) -> ColoredString;
    /// Plain values
    fn value(&self) -> ColoredString;
}

impl<S: AsRef<str>> PaletteExt for S {
    fn healthy(&self) -> ColoredString {
        self.as_ref().bright_green()
    }

    fn caution(&self) -> ColoredString {
        self.as_ref().bright_yellow()
    }

    fn danger(&self) -> ColoredString {
        self.as_ref().bright_red()
    }

    fn label(&self) -> ColoredString {
        self.as_ref().bright_cyan()
    }

    fn heading(&self) -> ColoredString {
        self.as_ref().bright_purple()
    }

    fn muted(&self) -> ColoredString {
        self.as_ref().bright_black()
    }

    fn value(&self) -> ColoredString {
        self.as_ref().bright_white()
    }
}

/// Color `text` according to `status`.
pub fn status_colored(text: &str, status: CheckStatus) -> ColoredString {
    match status {
        CheckStatus::Ok => text.healthy(),
        CheckStatus::Expiring => text.caution(),
        CheckStatus::Expired | CheckStatus::Error => text.danger(),
    }
}
