//! Output module for turning stored records into the final table
//!
//! This module handles:
//! - Unioning per-record attribute sets into one column list
//! - Writing the padded rows as delimited text
//! - Reporting statistics about a stored run

pub mod stats;
mod table;
pub mod writer;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use table::{unify, UnifiedTable};
pub use writer::{write_table, write_table_to_path};

use crate::storage::{RecordStore, RunStatus};
use crate::HarvestError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// What an export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub run_id: i64,
    pub rows: usize,
    pub columns: usize,
    pub path: PathBuf,
}

/// Re-reads every record of a run and writes the unified table
///
/// # Arguments
///
/// * `store` - The store holding the run's records
/// * `run_id` - Which run to export
/// * `path` - Destination file
/// * `delimiter` - Field delimiter byte
///
/// # Returns
///
/// * `Ok(ExportSummary)` - Rows and columns written
/// * `Err(HarvestError)` - Reading the store or writing the file failed
pub fn export_run(
    store: &dyn RecordStore,
    run_id: i64,
    path: &Path,
    delimiter: u8,
) -> Result<ExportSummary, HarvestError> {
    let records = store.load_records(run_id)?;
    tracing::info!("Exporting {} records from run {}", records.len(), run_id);

    let table = unify(&records);
    write_table_to_path(&table, path, delimiter)?;

    Ok(ExportSummary {
        run_id,
        rows: table.len(),
        columns: table.columns.len(),
        path: path.to_path_buf(),
    })
}

/// Exports the most recent run, whatever its status
///
/// Used to rebuild the table from stored records without touching the
/// network, including for a run that was interrupted.
pub fn export_latest(
    store: &dyn RecordStore,
    path: &Path,
    delimiter: u8,
) -> Result<ExportSummary, HarvestError> {
    let run = store.get_latest_run()?.ok_or(HarvestError::NoRuns)?;
    if run.status != RunStatus::Completed {
        tracing::warn!(
            "Run {} is {}; exporting the records stored so far",
            run.id,
            run.status.to_db_string()
        );
    }
    export_run(store, run.id, path, delimiter)
}
