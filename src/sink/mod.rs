// src/sink/mod.rs
// =============================================================================
// This module stores qualifying products.
//
// A sink is a table with fixed columns (see product::COLUMNS). New records
// go directly below the header row, so the newest product is always on top,
// just like inserting at row 2 of a spreadsheet.
//
// Implementations:
// - CsvSink: a CSV file on disk, kept across runs
// - MemorySink: a table held in memory (tests)
// =============================================================================

mod csv_table;

pub use csv_table::CsvSink;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::product::ProductRecord;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to access table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("table {} has columns {found:?}, expected {expected:?}", .path.display())]
    ColumnMismatch {
        path: PathBuf,
        found: Vec<String>,
        expected: Vec<String>,
    },
}

/// Somewhere to put qualifying products
///
/// Shared by every product consumer, so implementations handle their own
/// locking.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &ProductRecord) -> Result<(), SinkError>;
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    records: tokio::sync::Mutex<Vec<ProductRecord>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records, newest first
    pub async fn records(&self) -> Vec<ProductRecord> {
        self.records.lock().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, record: &ProductRecord) -> Result<(), SinkError> {
        self.records.lock().await.insert(0, record.clone());
        Ok(())
    }
}
