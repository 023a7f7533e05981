mod fetch;
mod orchestrator;
mod report;

pub use fetch::{HttpSourceFetcher, SourceFetcher, SyncRunError};
pub use orchestrator::run_sync;
pub use report::{SyncError, SyncReport, SyncStats};
