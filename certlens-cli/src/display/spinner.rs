use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while a single certificate check is in flight.
pub struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    /// Spinner for the check of `host:port`.
    pub fn checking(host: &str, port: u16) -> Self {
        Self::with_bar(ProgressBar::new_spinner(), host, port)
    }

    fn with_bar(progress: ProgressBar, host: &str, port: u16) -> Self {
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("◐◓◑◒●")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            progress.set_style(style);
        }
        progress.set_message(format!("Checking certificate on {}:{}", host, port));
        progress.enable_steady_tick(Duration::from_millis(120));

        Self { progress }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.progress.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_target() {
        let spinner = Spinner::with_bar(ProgressBar::hidden(), "example.com", 8443);
        assert_eq!(
            spinner.progress.message(),
            "Checking certificate on example.com:8443"
        );
        spinner.finish();
        assert!(spinner.progress.is_finished());
    }
}
