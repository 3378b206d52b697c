//! Statistics about a stored harvest run
//!
//! This module provides functionality for extracting and displaying
//! run statistics from the record store.

use crate::storage::{RecordStore, RunRecord};
use crate::HarvestError;
use chrono::{DateTime, Utc};

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// The run these numbers describe
    pub run: RunRecord,

    /// Wall-clock duration, known only for finished runs
    pub duration_seconds: Option<i64>,

    /// Number of stored product records
    pub records: usize,

    /// Number of distinct attribute names across those records
    pub columns: usize,
}

fn duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = run.finished_at.as_deref()?.parse::<DateTime<Utc>>().ok()?;
    Some((finished - started).num_seconds())
}

/// Loads statistics for the most recent run
///
/// # Arguments
///
/// * `store` - The record store to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError::NoRuns)` - The store holds no runs yet
pub fn load_statistics(store: &dyn RecordStore) -> Result<HarvestStatistics, HarvestError> {
    let run = store.get_latest_run()?.ok_or(HarvestError::NoRuns)?;

    let records = store.count_records(run.id)?;
    let columns = store.count_columns(run.id)?;

    Ok(HarvestStatistics {
        duration_seconds: duration_seconds(&run),
        run,
        records,
        columns,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  ID: {}", stats.run.id);
    println!("  Status: {}", stats.run.status.to_db_string());
    println!("  Started: {}", stats.run.started_at);
    println!(
        "  Finished: {}",
        stats.run.finished_at.as_deref().unwrap_or("-")
    );
    match stats.duration_seconds {
        Some(seconds) => println!("  Duration: {}s", seconds),
        None => println!("  Duration: -"),
    }
    println!();

    println!("Records:");
    println!("  Products stored: {}", stats.records);
    println!("  Distinct columns: {}", stats.columns);
}
