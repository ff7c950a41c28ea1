//! CSV serialization with a fixed header and no index column.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Result, VahanError};
use crate::schema::{AggregatedRow, CanonicalRecord, GrowthRow};

/// Row types with a fixed CSV column layout.
///
/// The header is written even when there are no rows.
pub trait CsvTable: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl CsvTable for CanonicalRecord {
    const COLUMNS: &'static [&'static str] =
        &["period", "year", "vehicle_category", "manufacturer", "registrations"];
}

impl CsvTable for AggregatedRow {
    const COLUMNS: &'static [&'static str] = &["period", "vehicle_category", "manufacturer", "total"];
}

impl CsvTable for GrowthRow {
    const COLUMNS: &'static [&'static str] = &[
        "period",
        "vehicle_category",
        "manufacturer",
        "total",
        "yoy_pct",
        "qoq_pct",
        "pop_pct",
    ];
}

/// Serialize rows to a CSV string. Missing metrics become empty fields.
pub fn to_csv_string<T: CsvTable>(rows: &[T]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| VahanError::Config(format!("Failed to flush CSV buffer: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| VahanError::Config(format!("CSV output is not UTF-8: {}", e)))
}

/// Write rows to `path`, replacing any existing file in full.
///
/// The content goes to a uniquely named temporary file in the same directory
/// and is renamed into place, so readers never see a half-written file and
/// concurrent writers never share a temporary file.
pub fn write_csv<T: CsvTable>(rows: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = to_csv_string(rows)?;

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| VahanError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
            parent
        }
        None => Path::new("."),
    };

    let io_err = |e: std::io::Error| VahanError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| VahanError::Io {
        path: parent.to_path_buf(),
        source: e,
    })?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VehicleCategory;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn growth_row(yoy: Option<f64>) -> GrowthRow {
        GrowthRow {
            period: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            vehicle_category: VehicleCategory::TwoWheeler,
            manufacturer: "Acme, Ltd".to_string(),
            total: 1100.0,
            yoy_pct: yoy,
            qoq_pct: None,
            pop_pct: yoy,
        }
    }

    #[test]
    fn test_growth_csv_layout() {
        let csv = to_csv_string(&[growth_row(Some(10.0)), growth_row(None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "period,vehicle_category,manufacturer,total,yoy_pct,qoq_pct,pop_pct"
        );
        assert_eq!(lines[1], "2022-01-01,2W,\"Acme, Ltd\",1100.0,10.0,,10.0");
        assert_eq!(lines[2], "2022-01-01,2W,\"Acme, Ltd\",1100.0,,,");
    }

    #[test]
    fn test_header_only_for_empty_table() {
        let csv = to_csv_string::<AggregatedRow>(&[]).unwrap();
        assert_eq!(csv, "period,vehicle_category,manufacturer,total\n");
    }

    #[test]
    fn test_canonical_unset_period() {
        let record = CanonicalRecord {
            period: None,
            year: None,
            vehicle_category: VehicleCategory::Other,
            manufacturer: "Zed".to_string(),
            registrations: 0.0,
        };
        let csv = to_csv_string(&[record]).unwrap();
        assert_eq!(csv.lines().nth(1), Some(",,OTHER,Zed,0.0"));
    }

    #[test]
    fn test_write_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("aggregated.csv");

        write_csv(&[growth_row(None), growth_row(None)], &path).unwrap();
        write_csv(&[growth_row(None)], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_writes_leave_a_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("growth.csv");
        let small = vec![growth_row(None)];
        let large = vec![growth_row(Some(1.0)); 500];

        std::thread::scope(|s| {
            for i in 0..8 {
                let path = &path;
                let rows = if i % 2 == 0 { &small } else { &large };
                s.spawn(move || write_csv(rows, path).unwrap());
            }
        });

        let lines = fs::read_to_string(&path).unwrap().lines().count();
        assert!(lines == 2 || lines == 501, "torn file with {} lines", lines);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "growth.csv")
            .collect();
        assert!(leftovers.is_empty(), "stray files: {:?}", leftovers);
    }
}
