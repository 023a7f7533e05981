use serde::Serialize;

/// One row-level problem, with enough context to find the source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncError {
    pub row_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl SyncError {
    pub fn new(
        row_number: usize,
        external_id: Option<&str>,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_number,
            external_id: external_id.map(str::to_string),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStats {
    pub total_rows: usize,
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Summary of one sync run. Built by the orchestrator and handed back
/// read-only once the run finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    stats: SyncStats,
    errors: Vec<SyncError>,
}

impl SyncReport {
    pub(super) fn new(total_rows: usize) -> Self {
        Self {
            stats: SyncStats {
                total_rows,
                ..SyncStats::default()
            },
            errors: Vec::new(),
        }
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Row errors in source order.
    pub fn errors(&self) -> &[SyncError] {
        &self.errors
    }

    pub(super) fn record_inserted(&mut self) {
        self.stats.inserted += 1;
        self.stats.processed += 1;
    }

    pub(super) fn record_updated(&mut self) {
        self.stats.updated += 1;
        self.stats.processed += 1;
    }

    /// A row rejected by validation: counted as skipped and as an error.
    pub(super) fn record_rejected(&mut self, error: SyncError) {
        self.stats.skipped += 1;
        self.stats.errors += 1;
        self.errors.push(error);
    }

    /// A row whose datastore read or write failed.
    pub(super) fn record_store_failure(&mut self, error: SyncError) {
        self.stats.errors += 1;
        self.errors.push(error);
    }
}
