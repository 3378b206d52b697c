//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::record::{self, ProductRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status";

/// SQLite record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the store at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
    })
}

impl RecordStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Records =====

    fn append_records(
        &mut self,
        run_id: i64,
        records: &[(usize, ProductRecord)],
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        {
            let mut insert_record = tx.prepare_cached(
                "INSERT INTO records (run_id, position, url, appended_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut insert_field = tx.prepare_cached(
                "INSERT INTO record_fields (record_id, ordinal, name, value) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (position, product) in records {
                let url = product.get(record::URL).unwrap_or_default();
                insert_record
                    .execute(params![run_id, *position as i64, url, now])
                    .map_err(|e| match e {
                        rusqlite::Error::SqliteFailure(ref err, _)
                            if err.code == ErrorCode::ConstraintViolation =>
                        {
                            StorageError::DuplicatePosition {
                                run_id,
                                position: *position,
                            }
                        }
                        other => StorageError::Sqlite(other),
                    })?;
                let record_id = tx.last_insert_rowid();

                for (ordinal, (name, value)) in product.iter().enumerate() {
                    insert_field.execute(params![record_id, ordinal as i64, name, value])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_records(&self, run_id: i64) -> StorageResult<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, f.name, f.value
             FROM records r
             LEFT JOIN record_fields f ON f.record_id = r.id
             WHERE r.run_id = ?1
             ORDER BY r.position, f.ordinal",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut records: Vec<ProductRecord> = Vec::new();
        let mut current_id = None;

        for row in rows {
            let (record_id, name, value) = row?;
            if current_id != Some(record_id) {
                current_id = Some(record_id);
                records.push(ProductRecord::new());
            }
            if let (Some(name), Some(product)) = (name, records.last_mut()) {
                product.insert(name, value.unwrap_or_default());
            }
        }

        Ok(records)
    }

    fn stored_positions(&self, run_id: i64) -> StorageResult<HashMap<usize, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT position, url FROM records WHERE run_id = ?1")?;

        let positions = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, String>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(positions)
    }

    fn count_records(&self, run_id: i64) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_columns(&self, run_id: i64) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT f.name)
             FROM record_fields f
             JOIN records r ON f.record_id = r.id
             WHERE r.run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
