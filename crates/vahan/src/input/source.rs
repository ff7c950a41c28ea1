//! Data source abstraction and metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::Granularity;

/// Metadata about one loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Year embedded in the file name, if any.
    pub name_year: Option<i32>,
    /// Data rows read, including skipped ones.
    pub rows_read: usize,
    /// Rows skipped as malformed.
    pub rows_skipped: usize,
    /// Granularity detected from this source's columns.
    pub granularity: Granularity,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been parsed.
    pub fn new(path: PathBuf, hash: String, size_bytes: u64) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            name_year: None,
            rows_read: 0,
            rows_skipped: 0,
            granularity: Granularity::Yearly,
            loaded_at: Utc::now(),
        }
    }

    /// Rows that made it into the canonical table.
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_skipped
    }
}

/// A row dropped while reading a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Source identifier (file name).
    pub source: String,
    /// 1-based line number in the source, header included.
    pub row: usize,
    /// Why the row was dropped.
    pub reason: String,
}

/// Parsed tabular data, all cells kept as strings.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    /// Column headers as they appear in the file.
    pub headers: Vec<String>,
    /// Row data (row-major order), padded to the header width.
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed == "-"
    }
}
