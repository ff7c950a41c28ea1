//! Error types for the vahan library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vahan operations.
#[derive(Debug, Error)]
pub enum VahanError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No source files matched the discovery pattern.
    #[error("No CSV files found matching '{pattern}' in {}", dir.display())]
    NoSources { dir: PathBuf, pattern: String },

    /// Granularity argument outside monthly/quarterly/yearly.
    #[error("Unsupported frequency: '{0}' (expected M, Q or Y)")]
    UnsupportedFrequency(String),

    /// A row could not be read and strict mode is enabled.
    #[error("Malformed row {row} in '{source_name}': {message}")]
    MalformedRow {
        source_name: String,
        row: usize,
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A table or schema name that is not a plain SQL identifier.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Analytic store error.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Glob pattern error.
    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type alias for vahan operations.
pub type Result<T> = std::result::Result<T, VahanError>;
