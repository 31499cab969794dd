// src/sink/csv_table.rs
// =============================================================================
// A CSV file used as the product table.
//
// On open we read any rows left by earlier runs (the header must match our
// columns). An empty file counts as a new table. Every append puts the new
// row on top and rewrites the file: write to "<name>.tmp" first, then rename
// over the original, so a crash mid-write never leaves a half-written table
// behind.
//
// The rewrite is blocking file I/O, so it runs on tokio's blocking pool and
// the crawl keeps fetching while a table is written.
// =============================================================================

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::StringRecord;
use tokio::sync::Mutex;

use super::{RecordSink, SinkError};
use crate::product::{ProductRecord, COLUMNS};

pub struct CsvSink {
    path: PathBuf,
    rows: Mutex<Vec<StringRecord>>,
}

impl CsvSink {
    // Opens an existing table or creates a new one holding just the header
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();

        let rows = if has_content(&path)? {
            read_rows(&path)?
        } else {
            write_rows(&path, &[])?;
            Vec::new()
        };

        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn append(&self, record: &ProductRecord) -> Result<(), SinkError> {
        // Held across the write so appends reach the file in order
        let mut rows = self.rows.lock().await;
        rows.insert(0, StringRecord::from(record.to_row().to_vec()));

        let path = self.path.clone();
        let snapshot = rows.clone();
        let written = tokio::task::spawn_blocking(move || write_rows(&path, &snapshot))
            .await
            .unwrap_or_else(|e| {
                Err(SinkError::Io {
                    path: self.path.clone(),
                    source: std::io::Error::other(e),
                })
            });

        if written.is_err() {
            // Keep memory and file in step
            rows.remove(0);
        }
        written
    }
}

fn has_content(path: &Path) -> Result<bool, SinkError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SinkError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_rows(path: &Path) -> Result<Vec<StringRecord>, SinkError> {
    let csv_error = |source| SinkError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;

    let header = reader.headers().map_err(csv_error)?.clone();
    if !header.iter().eq(COLUMNS.iter().copied()) {
        return Err(SinkError::ColumnMismatch {
            path: path.to_path_buf(),
            found: header.iter().map(String::from).collect(),
            expected: COLUMNS.iter().map(|c| c.to_string()).collect(),
        });
    }

    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)
}

fn write_rows(path: &Path, rows: &[StringRecord]) -> Result<(), SinkError> {
    let temp = temp_path(path);

    let result = write_table(&temp, rows).and_then(|()| {
        std::fs::rename(&temp, path).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        // Best effort, the temp file may never have been created
        let _ = std::fs::remove_file(&temp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

fn write_table(temp: &Path, rows: &[StringRecord]) -> Result<(), SinkError> {
    let csv_error = |source| SinkError::Csv {
        path: temp.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(temp).map_err(csv_error)?;
    writer.write_record(COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| SinkError::Io {
        path: temp.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::record;

    fn titles(path: &Path) -> Vec<String> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|row| row.unwrap()[3].to_string())
            .collect()
    }

    #[test]
    fn test_new_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        CsvSink::open(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), COLUMNS.join(","));
    }

    #[tokio::test]
    async fn test_newest_row_on_top() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record("first")).await.unwrap();
        sink.append(&record("second")).await.unwrap();

        assert_eq!(titles(&path), vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        CsvSink::open(&path)
            .unwrap()
            .append(&record("yesterday"))
            .await
            .unwrap();

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record("today")).await.unwrap();

        assert_eq!(titles(&path), vec!["today", "yesterday"]);
    }

    #[tokio::test]
    async fn test_row_matches_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record("argan")).await.unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        let cells: Vec<&str> = row.iter().collect();
        assert_eq!(
            cells,
            vec![
                "Волосы",
                "Шампуни",
                "-",
                "argan",
                "for dry hair",
                "250",
                "500",
                "2",
                "https://shop.example/argan",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_file_is_a_new_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(&path, "").unwrap();

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record("argan")).await.unwrap();

        assert_eq!(titles(&path), vec!["argan"]);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record("kept")).await.unwrap();

        // A directory in place of the table makes the rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(sink.append(&record("lost")).await.is_err());
        assert!(!temp_path(&path).exists());

        std::fs::remove_dir(&path).unwrap();
        sink.append(&record("next")).await.unwrap();
        assert_eq!(titles(&path), vec!["next", "kept"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let sink = std::sync::Arc::new(CsvSink::open(&path).unwrap());

        let writers: Vec<_> = (0..10)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.append(&record(&format!("p{}", i))).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        assert_eq!(titles(&path).len(), 10);
    }

    #[test]
    fn test_foreign_table_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(&path, "name,price\nsoap,10\n").unwrap();

        assert!(matches!(
            CsvSink::open(&path),
            Err(SinkError::ColumnMismatch { .. })
        ));
    }
}
