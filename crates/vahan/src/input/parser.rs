//! Tolerant CSV reader: string-typed cells, malformed rows skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::source::{DataTable, SkippedRow, SourceMetadata};
use crate::error::{Result, VahanError};

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Fail on the first malformed row instead of skipping it.
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            strict: false,
        }
    }
}

/// Output of parsing one source file.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub table: DataTable,
    pub metadata: SourceMetadata,
    pub skipped: Vec<SkippedRow>,
}

/// Parses delimited source files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file into a string table, recording skipped rows.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedSource> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| VahanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| VahanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let mut metadata = SourceMetadata::new(path.to_path_buf(), hash, contents.len() as u64);
        let (table, skipped) = self.parse_bytes(&contents, &metadata.file)?;

        metadata.rows_read = table.row_count() + skipped.len();
        metadata.rows_skipped = skipped.len();

        Ok(ParsedSource {
            table,
            metadata,
            skipped,
        })
    }

    /// Parse bytes directly. `source` names the origin in diagnostics.
    pub fn parse_bytes(&self, bytes: &[u8], source: &str) -> Result<(DataTable, Vec<SkippedRow>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Ok((DataTable::default(), Vec::new()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let fallback_line = row_idx + 2;

            let outcome = match result {
                Ok(record) if record.len() > expected_cols => {
                    let line = record
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    Err((
                        line,
                        format!("expected {} fields, found {}", expected_cols, record.len()),
                    ))
                }
                Ok(record) => Ok(record),
                Err(e) => {
                    let line = e
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    Err((line, e.to_string()))
                }
            };

            match outcome {
                Ok(record) => {
                    let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                    row.resize(expected_cols, String::new());
                    rows.push(row);
                }
                Err((line, message)) => {
                    if self.config.strict {
                        return Err(VahanError::MalformedRow {
                            source_name: source.to_string(),
                            row: line,
                            message,
                        });
                    }
                    warn!(source = source, row = line, reason = %message, "skipping malformed row");
                    skipped.push(SkippedRow {
                        source: source.to_string(),
                        row: line,
                        reason: message,
                    });
                }
            }
        }

        Ok((DataTable::new(headers, rows), skipped))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
