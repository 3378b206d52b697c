//! Delimited-text serialization of a unified table

use crate::output::{OutputResult, UnifiedTable};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header name with line breaks removed
///
/// Only header names are cleaned; values are written as-is and quoted by the
/// encoder when needed.
pub fn clean_header(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Writes `table` as a header row followed by one row per record
///
/// A table without columns produces no output at all.
pub fn write_table<W: Write>(table: &UnifiedTable, writer: W, delimiter: u8) -> OutputResult<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    if table.columns.is_empty() {
        out.flush()?;
        return Ok(());
    }

    out.write_record(table.columns.iter().map(|name| clean_header(name)))?;
    for row in &table.rows {
        out.write_record(row)?;
    }

    out.flush()?;
    Ok(())
}

/// Writes `table` to a file at `path`, replacing any existing file
pub fn write_table_to_path(table: &UnifiedTable, path: &Path, delimiter: u8) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_table(table, BufWriter::new(file), delimiter)?;

    tracing::info!(
        "Wrote {} rows x {} columns to {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(())
}
