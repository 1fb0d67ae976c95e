use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::items::{BulkCheckResult, BulkItem};
use crate::check::{CertChecker, CheckResult};
use crate::config::CheckerConfig;
use crate::error::{CertLensError, Result};

/// Error message of results whose check did not finish before the deadline.
pub const BULK_TIMEOUT_MESSAGE: &str = "Timed out while performing SSL check";

/// Called as `(completed, total, host)` each time a check finishes.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Runs many certificate checks with bounded concurrency and one overall
/// deadline. Output always has one entry per input item, in input order.
#[derive(Debug, Clone)]
pub struct BulkExecutor {
    checker: CertChecker,
    concurrency: usize,
    timeout: Duration,
    max_items: usize,
    use_fallback: bool,
    resolve_dns: bool,
}

impl BulkExecutor {
    pub fn new(checker: CertChecker) -> Self {
        let config = CheckerConfig::default();
        Self {
            checker,
            concurrency: config.bulk_concurrency,
            timeout: config.bulk_timeout(),
            max_items: config.max_bulk_items,
            use_fallback: false,
            resolve_dns: false,
        }
    }

    pub fn from_config(checker: CertChecker, config: &CheckerConfig) -> Self {
        Self::new(checker)
            .with_concurrency(config.bulk_concurrency)
            .with_timeout(config.bulk_timeout())
            .with_max_items(config.max_bulk_items)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Route intercepted results through each item's `client_ip`, and
    /// optionally through DNS when an item has no IP.
    pub fn with_fallback(mut self, enabled: bool, resolve_dns: bool) -> Self {
        self.use_fallback = enabled;
        self.resolve_dns = resolve_dns;
        self
    }

    /// Check every item and merge its client fields into the result.
    ///
    /// Fails only when the batch exceeds the configured maximum size.
    pub async fn execute(
        &self,
        items: Vec<BulkItem>,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<BulkCheckResult>> {
        if items.len() > self.max_items {
            return Err(CertLensError::InvalidBulkInput(format!(
                "{} items exceeds the limit of {}",
                items.len(),
                self.max_items
            )));
        }

        let results = self.run(&items, progress.as_ref()).await;

        Ok(items
            .iter()
            .zip(results)
            .map(|(item, result)| BulkCheckResult::new(item, result))
            .collect())
    }

    /// Check every item, returning bare results in input order.
    pub async fn check_bulk(&self, items: &[BulkItem]) -> Vec<CheckResult> {
        self.run(items, None).await
    }

    async fn run(&self, items: &[BulkItem], progress: Option<&ProgressCallback>) -> Vec<CheckResult> {
        let total = items.len();
        let deadline = Instant::now() + self.timeout;
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        debug!(
            total = total,
            concurrency = self.concurrency,
            timeout_ms = self.timeout.as_millis() as u64,
            "Starting bulk check"
        );

        let mut tasks = JoinSet::new();
        for (index, item) in items.iter().enumerate() {
            let semaphore = semaphore.clone();
            let checker = self.checker.clone();
            let host = item.client_domain.trim().to_string();
            let port = item.port;
            let fallback_ip = item.client_ip.clone();
            let use_fallback = self.use_fallback;
            let resolve_dns = self.resolve_dns;

            tasks.spawn(async move {
                // A closed semaphore leaves the slot empty for the placeholder.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, None);
                };

                let result = if use_fallback {
                    checker
                        .check_with_fallback(&host, port, fallback_ip.as_deref(), resolve_dns)
                        .await
                } else {
                    checker.check(&host, port).await
                };
                (index, Some(result))
            });
        }

        let mut slots: Vec<Option<CheckResult>> = vec![None; total];
        let mut completed = 0;

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((_, None)))) => {}
                Ok(Some(Ok((index, Some(result))))) => {
                    completed += 1;
                    if let Some(progress) = progress {
                        progress(completed, total, &result.host);
                    }
                    slots[index] = Some(result);
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "Bulk check task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(pending = tasks.len(), "Bulk check deadline elapsed");
                    break;
                }
            }
        }

        // Unfinished checks are abandoned so their sockets close now.
        tasks.abort_all();

        let placeholder_at = self.checker.clock().now();
        items
            .iter()
            .zip(slots)
            .map(|(item, slot)| {
                slot.unwrap_or_else(|| {
                    CheckResult::error(
                        item.client_domain.clone(),
                        item.port,
                        BULK_TIMEOUT_MESSAGE,
                        placeholder_at,
                    )
                })
            })
            .collect()
    }
}
