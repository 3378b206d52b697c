//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and the
//! associated error types.

use crate::record::ProductRecord;
use crate::storage::RunRecord;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Record at position {position} already stored for run {run_id}")]
    DuplicatePosition { run_id: i64, position: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-oriented sink for product records
///
/// Positions are discovery indexes into the run's product URL list. Each
/// position is stored at most once per run, and every read returns records
/// ordered by position.
pub trait RecordStore {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration the run was started with
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Records =====

    /// Appends a batch of `(position, record)` pairs atomically
    ///
    /// Either every record in the batch is stored or none is.
    fn append_records(
        &mut self,
        run_id: i64,
        records: &[(usize, ProductRecord)],
    ) -> StorageResult<()>;

    /// Appends a single record
    fn append(&mut self, run_id: i64, position: usize, record: &ProductRecord) -> StorageResult<()> {
        self.append_records(run_id, &[(position, record.clone())])
    }

    /// Loads every record of a run in position order
    fn load_records(&self, run_id: i64) -> StorageResult<Vec<ProductRecord>>;

    /// Product URL of every stored record of a run, keyed by position
    fn stored_positions(&self, run_id: i64) -> StorageResult<HashMap<usize, String>>;

    /// Number of records stored for a run
    fn count_records(&self, run_id: i64) -> StorageResult<usize>;

    /// Number of distinct attribute names across a run's records
    fn count_columns(&self, run_id: i64) -> StorageResult<usize>;
}
