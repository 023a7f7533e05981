use crate::csv_rows::{parse_document, RawRow};
use crate::db::PropertyStore;
use crate::domain::property::StoredProperty;
use crate::domain::reconcile::merge;
use crate::domain::validate::validate_row;
use crate::sync::{SourceFetcher, SyncError, SyncReport, SyncRunError};

/// Runs one full sync: fetch, parse, validate and reconcile each row in order.
///
/// Only a failed fetch aborts the run. Every row-level problem lands in the
/// report and processing moves on to the next row.
///
/// The lookup and the write for one external id are not atomic. Two overlapping
/// runs, or a run racing a manual edit of the same property, can lose an update.
pub fn run_sync<F, S>(fetcher: &F, store: &S) -> Result<SyncReport, SyncRunError>
where
    F: SourceFetcher + ?Sized,
    S: PropertyStore + ?Sized,
{
    let document = fetcher.fetch_document().map_err(|e| {
        log::error!("Sync aborted, source fetch failed: {e}");
        e
    })?;

    let rows = parse_document(&document, b',');
    log::info!("Sync started: {} rows", rows.len());

    let mut report = SyncReport::new(rows.len());
    for row in &rows {
        process_row(store, row, &mut report);
    }

    let stats = report.stats();
    log::info!(
        "Sync finished: {} processed ({} inserted, {} updated), {} skipped, {} errors",
        stats.processed,
        stats.inserted,
        stats.updated,
        stats.skipped,
        stats.errors
    );
    Ok(report)
}

fn process_row<S: PropertyStore + ?Sized>(store: &S, row: &RawRow, report: &mut SyncReport) {
    let incoming = match validate_row(row, row.line_number) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Row {} rejected: {}", e.row_number, e.message);
            report.record_rejected(e);
            return;
        }
    };

    let store_failure = |action: &str, e: &dyn std::fmt::Display| {
        log::warn!(
            "Row {} ({}): {action} failed: {e}",
            row.line_number,
            incoming.external_id
        );
        SyncError::new(
            row.line_number,
            Some(&incoming.external_id),
            None,
            format!("Failed to {action} property: {e}"),
        )
    };

    let existing = match store.find_by_external_id(&incoming.external_id) {
        Ok(existing) => existing,
        Err(e) => {
            report.record_store_failure(store_failure("look up", &e));
            return;
        }
    };

    match existing {
        None => {
            let stored = StoredProperty::from_validated(incoming.clone());
            match store.insert(&stored) {
                Ok(()) => report.record_inserted(),
                Err(e) => report.record_store_failure(store_failure("insert", &e)),
            }
        }
        Some(existing) => {
            let merged = merge(&existing, &incoming);
            match store.update(&merged) {
                Ok(()) => report.record_updated(),
                Err(e) => report.record_store_failure(store_failure("update", &e)),
            }
        }
    }
}
