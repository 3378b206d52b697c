//! Schema union across records with heterogeneous attribute sets

use crate::record::ProductRecord;
use std::collections::HashMap;

/// Records padded to a shared column set
///
/// Every row has exactly one value per column; attributes a record never had
/// hold the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl UnifiedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|values| values[index].as_str())
    }

    /// Row `row` as a record keyed by every column, in column order
    pub fn record(&self, row: usize) -> Option<ProductRecord> {
        let values = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .zip(values)
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect(),
        )
    }
}

/// Unions the attribute names of `records` and backfills missing values
///
/// Columns appear in the order their names are first seen, scanning records
/// in order and each record's attributes in order. Rows keep record order.
///
/// # Example
///
/// ```
/// use sumi_harvest::{unify, ProductRecord};
///
/// let first: ProductRecord = [("a", "1"), ("b", "2")].into_iter().collect();
/// let second: ProductRecord = [("a", "3"), ("c", "4")].into_iter().collect();
///
/// let table = unify(&[first, second]);
/// assert_eq!(table.columns, vec!["a", "b", "c"]);
/// assert_eq!(table.rows[1], vec!["3", "", "4"]);
/// ```
pub fn unify(records: &[ProductRecord]) -> UnifiedTable {
    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        for name in record.names() {
            if !index.contains_key(name) {
                index.insert(name, columns.len());
                columns.push(name.to_string());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![String::new(); columns.len()];
            for (name, value) in record.iter() {
                row[index[name]] = value.to_string();
            }
            row
        })
        .collect();

    UnifiedTable { columns, rows }
}
