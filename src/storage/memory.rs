//! In-memory record store
//!
//! Same contract as [`SqliteStore`](crate::storage::SqliteStore) without any
//! durability. Useful when a run never needs to be resumed, and in tests.

use crate::record::{self, ProductRecord};
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Record store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    runs: Vec<RunRecord>,
    records: HashMap<i64, BTreeMap<usize, ProductRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_mut(&mut self, run_id: i64) -> StorageResult<&mut RunRecord> {
        self.runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or(StorageError::RunNotFound(run_id))
    }
}

impl RecordStore for MemoryStore {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let id = self.runs.len() as i64 + 1;
        self.runs.push(RunRecord {
            id,
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            status: RunStatus::Running,
        });
        Ok(id)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.runs
            .iter()
            .find(|run| run.id == run_id)
            .cloned()
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        Ok(self.runs.last().cloned())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let run = self.run_mut(run_id)?;
        run.status = RunStatus::Completed;
        run.finished_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    fn append_records(
        &mut self,
        run_id: i64,
        records: &[(usize, ProductRecord)],
    ) -> StorageResult<()> {
        self.get_run(run_id)?;
        let stored = self.records.entry(run_id).or_default();

        // Validate the whole batch first so a failed append stores nothing
        let mut seen = HashSet::new();
        for (position, _) in records {
            if stored.contains_key(position) || !seen.insert(*position) {
                return Err(StorageError::DuplicatePosition {
                    run_id,
                    position: *position,
                });
            }
        }

        for (position, record) in records {
            stored.insert(*position, record.clone());
        }
        Ok(())
    }

    fn load_records(&self, run_id: i64) -> StorageResult<Vec<ProductRecord>> {
        Ok(self
            .records
            .get(&run_id)
            .map(|stored| stored.values().cloned().collect())
            .unwrap_or_default())
    }

    fn stored_positions(&self, run_id: i64) -> StorageResult<HashMap<usize, String>> {
        Ok(self
            .records
            .get(&run_id)
            .map(|stored| {
                stored
                    .iter()
                    .map(|(position, product)| {
                        let url = product.get(record::URL).unwrap_or_default();
                        (*position, url.to_string())
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn count_records(&self, run_id: i64) -> StorageResult<usize> {
        Ok(self.records.get(&run_id).map_or(0, BTreeMap::len))
    }

    fn count_columns(&self, run_id: i64) -> StorageResult<usize> {
        let names: HashSet<&str> = self
            .records
            .get(&run_id)
            .into_iter()
            .flat_map(|stored| stored.values())
            .flat_map(ProductRecord::names)
            .collect();
        Ok(names.len())
    }
}
