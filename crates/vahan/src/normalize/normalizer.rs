//! Discover, parse and normalize registration extracts.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::classify::classify;
use super::columns::{
    parse_date, parse_month, parse_quarter, parse_registrations, parse_year, ColumnIndex,
    CATEGORY, DATE, MANUFACTURER, MONTH, PERIOD, QUARTER, REGISTRATIONS, YEAR,
};
use super::detect::detect_granularity;
use crate::error::Result;
use crate::input::{DataTable, Parser, ParserConfig, SkippedRow, SourceDiscovery, SourceMetadata};
use crate::schema::{CanonicalRecord, Granularity, VehicleCategory};

/// Manufacturer used when the column is missing or the cell is blank.
pub const UNKNOWN_MANUFACTURER: &str = "UNKNOWN";

/// Normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Literal file-name token preceding the year, e.g. `maker` in `maker 2021.csv`.
    pub file_prefix: String,
    /// Fail the whole load on the first malformed row.
    pub strict: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            file_prefix: "maker".to_string(),
            strict: false,
            delimiter: b',',
        }
    }
}

/// Load-wide metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadMetadata {
    /// Finest granularity detected across sources.
    pub granularity: Granularity,
    /// Per-source metadata, in load order.
    pub sources: Vec<SourceMetadata>,
}

/// The canonical fact table plus diagnostics.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub records: Vec<CanonicalRecord>,
    pub metadata: LoadMetadata,
    /// Rows dropped while reading, across all sources.
    pub skipped: Vec<SkippedRow>,
}

impl LoadResult {
    /// Number of rows dropped as malformed.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Records produced from a single source table.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub records: Vec<CanonicalRecord>,
    pub granularity: Granularity,
}

/// Turns raw source tables into canonical records.
pub struct Normalizer {
    discovery: SourceDiscovery,
    parser: Parser,
}

impl Normalizer {
    /// Create a normalizer with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(NormalizerConfig::default())
    }

    /// Create a normalizer with custom configuration.
    pub fn with_config(config: NormalizerConfig) -> Result<Self> {
        let discovery = SourceDiscovery::new(&config.file_prefix)?;
        let parser = Parser::with_config(ParserConfig {
            delimiter: config.delimiter,
            strict: config.strict,
            ..ParserConfig::default()
        });

        Ok(Self { discovery, parser })
    }

    /// Discover every matching source under `path` and normalize them into one table.
    ///
    /// Fails if no source matches. Malformed rows are skipped and reported in
    /// [`LoadResult::skipped`] unless strict mode is on.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadResult> {
        let files = self.discovery.discover(path)?;

        let mut records = Vec::new();
        let mut sources = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for file in files {
            let parsed = self.parser.parse_file(&file)?;
            let mut metadata = parsed.metadata;
            metadata.name_year = self.discovery.year_from_name(&metadata.file);

            let normalized = self.normalize_table(&parsed.table, metadata.name_year);
            metadata.granularity = normalized.granularity;

            info!(
                file = %metadata.file,
                rows = normalized.records.len(),
                skipped = metadata.rows_skipped,
                granularity = %normalized.granularity,
                "loaded source"
            );

            records.extend(normalized.records);
            skipped.extend(parsed.skipped);
            sources.push(metadata);
        }

        let granularity = sources
            .iter()
            .map(|s| s.granularity)
            .min()
            .unwrap_or(Granularity::Yearly);

        info!(
            sources = sources.len(),
            records = records.len(),
            skipped = skipped.len(),
            granularity = %granularity,
            "normalized load"
        );

        Ok(LoadResult {
            records,
            metadata: LoadMetadata {
                granularity,
                sources,
            },
            skipped,
        })
    }

    /// Normalize one source identified by `name` (typically a file name).
    pub fn normalize_named(&self, name: &str, table: &DataTable) -> NormalizedSource {
        self.normalize_table(table, self.discovery.year_from_name(name))
    }

    /// Normalize one parsed table. `name_year` fills in a missing `year` column
    /// and any `year` cell that does not parse.
    pub fn normalize_table(&self, table: &DataTable, name_year: Option<i32>) -> NormalizedSource {
        let columns = ColumnIndex::for_table(table);
        let granularity = detect_granularity(&columns, table);

        let records = table
            .rows
            .iter()
            .map(|row| normalize_row(&columns, row, name_year, granularity))
            .collect();

        NormalizedSource {
            records,
            granularity,
        }
    }
}

/// Build one canonical record from a raw row.
fn normalize_row(
    columns: &ColumnIndex,
    row: &[String],
    name_year: Option<i32>,
    granularity: Granularity,
) -> CanonicalRecord {
    // A blank or unreadable year cell falls back to the source's year.
    let year = columns.cell(row, YEAR).and_then(parse_year).or(name_year);

    let date_cell = columns.cell(row, PERIOD).or_else(|| columns.cell(row, DATE));
    let period = match date_cell.and_then(parse_date) {
        Some(date) => Some(granularity.bucket(date)),
        None => derive_period(columns, row, year),
    };
    let year = period.map(|p| p.year()).or(year);

    let vehicle_category = columns
        .cell(row, CATEGORY)
        .map(classify)
        .unwrap_or(VehicleCategory::Other);

    let manufacturer = columns
        .cell(row, MANUFACTURER)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_MANUFACTURER)
        .to_string();

    let registrations = columns
        .cell(row, REGISTRATIONS)
        .map(parse_registrations)
        .unwrap_or(0.0);

    CanonicalRecord {
        period,
        year,
        vehicle_category,
        manufacturer,
        registrations,
    }
}

/// Period start from the year plus an optional month or quarter column.
fn derive_period(columns: &ColumnIndex, row: &[String], year: Option<i32>) -> Option<NaiveDate> {
    let year = year?;
    let month = if columns.contains(MONTH) {
        columns.cell(row, MONTH).and_then(parse_month)?
    } else if columns.contains(QUARTER) {
        (columns.cell(row, QUARTER).and_then(parse_quarter)? - 1) * 3 + 1
    } else {
        1
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_year_from_source_name() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(
            &[" Maker ", "Vehicle_Category", "TOTAL"],
            &[&["  Acme Motors ", "Two Wheeler", "1,000"]],
        );
        let out = normalizer.normalize_named("maker 2021.csv", &t);

        assert_eq!(out.granularity, Granularity::Yearly);
        assert_eq!(out.records.len(), 1);
        let r = &out.records[0];
        assert_eq!(r.period, Some(d(2021, 1, 1)));
        assert_eq!(r.year, Some(2021));
        assert_eq!(r.vehicle_category, VehicleCategory::TwoWheeler);
        assert_eq!(r.manufacturer, "Acme Motors");
        assert_eq!(r.registrations, 1000.0);
    }

    #[test]
    fn test_year_column_takes_precedence() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["year", "maker", "total"], &[&["2019", "A", "5"], &["bad", "B", "6"]]);
        let out = normalizer.normalize_named("maker 2021.csv", &t);

        assert_eq!(out.records[0].period, Some(d(2019, 1, 1)));
        assert_eq!(out.records[1].year, Some(2021));
        assert_eq!(out.records[1].period, Some(d(2021, 1, 1)));
        assert_eq!(out.records[1].registrations, 6.0);
    }

    #[test]
    fn test_blank_year_cell_uses_source_year() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(
            &["Year", "Maker", "Vehicle_Category", "Total"],
            &[&["2021", "Acme", "Car", "10"], &["", "Acme", "Car", "5"]],
        );
        let out = normalizer.normalize_named("maker 2021.csv", &t);

        assert_eq!(out.records[1].year, Some(2021));
        assert_eq!(out.records[1].period, Some(d(2021, 1, 1)));
        assert_eq!(out.records[1].registrations, 5.0);
    }

    #[test]
    fn test_blank_year_cell_without_source_year() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["year", "maker", "total"], &[&["", "A", "5"]]);
        let out = normalizer.normalize_named("maker latest.csv", &t);

        assert_eq!(out.records[0].year, None);
        assert_eq!(out.records[0].period, None);
    }

    #[test]
    fn test_no_year_anywhere_leaves_period_unset() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["maker", "total"], &[&["A", "5"]]);
        let out = normalizer.normalize_named("maker latest.csv", &t);

        assert_eq!(out.records[0].year, None);
        assert_eq!(out.records[0].period, None);
    }

    #[test]
    fn test_missing_columns_default() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["maker"], &[&["A"], &[""]]);
        let out = normalizer.normalize_named("maker 2020.csv", &t);

        assert_eq!(out.records[0].registrations, 0.0);
        assert_eq!(out.records[0].vehicle_category, VehicleCategory::Other);
        assert_eq!(out.records[1].manufacturer, UNKNOWN_MANUFACTURER);
    }

    #[test]
    fn test_zero_rows_are_kept() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["maker", "total"], &[&["A", "0"], &["B", "junk"]]);
        let out = normalizer.normalize_named("maker 2020.csv", &t);
        assert_eq!(out.records.len(), 2);
    }

    #[test]
    fn test_month_column_builds_monthly_periods() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(
            &["Maker", "Month", "Total"],
            &[&["A", "3", "10"], &["A", "Dec", "20"], &["A", "13", "30"]],
        );
        let out = normalizer.normalize_named("maker 2022.csv", &t);

        assert_eq!(out.granularity, Granularity::Monthly);
        assert_eq!(out.records[0].period, Some(d(2022, 3, 1)));
        assert_eq!(out.records[1].period, Some(d(2022, 12, 1)));
        assert_eq!(out.records[2].period, None);
    }

    #[test]
    fn test_quarter_column_builds_quarter_starts() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(&["maker", "quarter", "total"], &[&["A", "Q3", "10"]]);
        let out = normalizer.normalize_named("maker 2022.csv", &t);

        assert_eq!(out.granularity, Granularity::Quarterly);
        assert_eq!(out.records[0].period, Some(d(2022, 7, 1)));
    }

    #[test]
    fn test_period_column_is_bucketed() {
        let normalizer = Normalizer::new().unwrap();
        let t = table(
            &["period", "maker", "total"],
            &[&["2021-05-17", "A", "1"], &["2021-06-01", "A", "2"]],
        );
        let out = normalizer.normalize_named("registrations.csv", &t);

        assert_eq!(out.granularity, Granularity::Monthly);
        assert_eq!(out.records[0].period, Some(d(2021, 5, 1)));
        assert_eq!(out.records[0].year, Some(2021));
    }
}
