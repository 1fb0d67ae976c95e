mod executor;
mod items;

pub use executor::{BulkExecutor, ProgressCallback, BULK_TIMEOUT_MESSAGE};
pub use items::{parse_bulk_items_from_file, BulkCheckResult, BulkItem};
