mod progress;
mod spinner;

pub use progress::{finish_bulk_progress, start_bulk_progress, ProgressWriterFactory};
pub use spinner::Spinner;
