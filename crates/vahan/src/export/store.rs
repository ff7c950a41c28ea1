//! Local SQLite mirror of a load: a raw table and an aggregated table per name.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::aggregate;
use crate::error::{Result, VahanError};
use crate::schema::{AggregatedRow, CanonicalRecord, Granularity};

/// Row lag used by the documented YoY query (twelve monthly buckets).
pub const SQL_YOY_LAG: usize = 12;

/// Separator between the schema and the table name.
const SCHEMA_SEPARATOR: &str = "__";

/// Suffix of the raw mirror table.
const RAW_SUFFIX: &str = "_raw";

// Single underscores only, never leading or trailing, so `__` is unambiguous.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:_[A-Za-z0-9]+)*$").unwrap());

/// Where and under which names the store is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file.
    pub path: PathBuf,
    /// Collection that namespaces the tables.
    pub schema: String,
    /// Base table name; the raw mirror gets a `_raw` suffix.
    /// Must not itself end in `_raw`.
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/analytics.sqlite"),
            schema: "vahan".to_string(),
            table: "agg_table".to_string(),
        }
    }
}

/// Row counts written by [`AnalyticsStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLoad {
    pub raw_rows: usize,
    pub aggregated_rows: usize,
}

/// One row of the YoY query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoyRow {
    pub period: NaiveDate,
    pub vehicle_category: String,
    pub manufacturer: String,
    pub total: f64,
    pub total_prev_year: Option<f64>,
    pub yoy_pct: Option<f64>,
}

/// SQLite-backed analytic store.
///
/// Tables live under `<schema>__<name>` (aggregated) and `<schema>__<name>_raw`.
/// Identifiers cannot contain `__` and table names cannot end in `_raw`, so
/// distinct (schema, name) pairs never share a table.
/// Every load drops and recreates both, so the store never owns data the
/// canonical table does not.
pub struct AnalyticsStore {
    conn: Connection,
    schema: String,
}

impl AnalyticsStore {
    /// Open (or create) a store file.
    pub fn open(path: impl AsRef<Path>, schema: &str) -> Result<Self> {
        let path = path.as_ref();
        validate_identifier(schema)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| VahanError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            schema: schema.to_string(),
        })
    }

    /// Open the store described by a config.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open(&config.path, &config.schema)
    }

    /// An in-memory store, mostly for tests.
    pub fn in_memory(schema: &str) -> Result<Self> {
        validate_identifier(schema)?;
        Ok(Self {
            conn: Connection::open_in_memory()?,
            schema: schema.to_string(),
        })
    }

    /// Fully qualified table name for `name`.
    pub fn table_name(&self, name: &str) -> Result<String> {
        validate_identifier(name)?;
        if name.ends_with(RAW_SUFFIX) {
            return Err(VahanError::InvalidIdentifier(name.to_string()));
        }
        Ok(format!("{}{}{}", self.schema, SCHEMA_SEPARATOR, name))
    }

    /// Raw mirror table name for `name`.
    pub fn raw_table_name(&self, name: &str) -> Result<String> {
        Ok(format!("{}{}", self.table_name(name)?, RAW_SUFFIX))
    }

    /// Replace the raw and aggregated tables for `name`.
    ///
    /// Both tables are dropped and recreated in one transaction.
    pub fn load(
        &mut self,
        records: &[CanonicalRecord],
        name: &str,
        granularity: Granularity,
    ) -> Result<StoreLoad> {
        let aggregated_table = self.table_name(name)?;
        let raw_table = self.raw_table_name(name)?;
        let aggregated = aggregate(records, granularity);

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            r#"
            DROP TABLE IF EXISTS {raw};
            CREATE TABLE {raw} (
                period           TEXT,
                year             INTEGER,
                vehicle_category TEXT NOT NULL,
                manufacturer     TEXT NOT NULL,
                registrations    REAL NOT NULL
            );
            DROP TABLE IF EXISTS {agg};
            CREATE TABLE {agg} (
                period           TEXT NOT NULL,
                vehicle_category TEXT NOT NULL,
                manufacturer     TEXT NOT NULL,
                total            REAL NOT NULL
            );
            "#,
            raw = raw_table,
            agg = aggregated_table,
        ))?;

        {
            let mut insert_raw = tx.prepare(&format!(
                "INSERT INTO {} (period, year, vehicle_category, manufacturer, registrations)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                raw_table
            ))?;
            for r in records {
                insert_raw.execute(params![
                    r.period,
                    r.year,
                    r.vehicle_category.as_str(),
                    r.manufacturer,
                    r.registrations
                ])?;
            }

            let mut insert_agg = tx.prepare(&format!(
                "INSERT INTO {} (period, vehicle_category, manufacturer, total)
                 VALUES (?1, ?2, ?3, ?4)",
                aggregated_table
            ))?;
            for row in &aggregated {
                insert_agg.execute(params![
                    row.period,
                    row.vehicle_category.as_str(),
                    row.manufacturer,
                    row.total
                ])?;
            }
        }
        tx.commit()?;

        info!(
            raw = %raw_table,
            aggregated = %aggregated_table,
            raw_rows = records.len(),
            aggregated_rows = aggregated.len(),
            "loaded analytic store"
        );

        Ok(StoreLoad {
            raw_rows: records.len(),
            aggregated_rows: aggregated.len(),
        })
    }

    /// Read back the aggregated table for `name`.
    pub fn read_aggregated(&self, name: &str) -> Result<Vec<AggregatedRow>> {
        let table = self.table_name(name)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT period, vehicle_category, manufacturer, total FROM {}
             ORDER BY vehicle_category, manufacturer, period",
            table
        ))?;

        let raw_rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, NaiveDate>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw_rows
            .into_iter()
            .map(|(period, category, manufacturer, total)| -> Result<AggregatedRow> {
                Ok(AggregatedRow {
                    period,
                    vehicle_category: category.parse()?,
                    manufacturer,
                    total,
                })
            })
            .collect()
    }

    /// YoY change with a 12-row lag per (category, manufacturer), ordered by period.
    ///
    /// Missing or zero previous totals give a NULL `yoy_pct`.
    pub fn yoy_query(&self, name: &str) -> Result<Vec<YoyRow>> {
        let table = self.table_name(name)?;
        let sql = format!(
            r#"
            WITH lagged AS (
              SELECT
                period,
                vehicle_category,
                manufacturer,
                total,
                LAG(total, {lag}) OVER (
                  PARTITION BY vehicle_category, manufacturer
                  ORDER BY period
                ) AS total_prev_year
              FROM {table}
            )
            SELECT
              period,
              vehicle_category,
              manufacturer,
              total,
              total_prev_year,
              CASE
                WHEN total_prev_year IS NULL OR total_prev_year = 0 THEN NULL
                ELSE (total / total_prev_year - 1) * 100
              END AS yoy_pct
            FROM lagged
            ORDER BY vehicle_category, manufacturer, period
            "#,
            lag = SQL_YOY_LAG,
            table = table,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(YoyRow {
                    period: row.get(0)?,
                    vehicle_category: row.get(1)?,
                    manufacturer: row.get(2)?,
                    total: row.get(3)?,
                    total_prev_year: row.get(4)?,
                    yoy_pct: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(VahanError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VehicleCategory;

    fn monthly_records(months: u32, total: f64) -> Vec<CanonicalRecord> {
        (0..months)
            .map(|i| {
                let period =
                    NaiveDate::from_ymd_opt(2021 + (i / 12) as i32, i % 12 + 1, 1).unwrap();
                CanonicalRecord::new(period, VehicleCategory::TwoWheeler, "Acme", total)
            })
            .collect()
    }

    #[test]
    fn test_load_and_read_back() {
        let mut store = AnalyticsStore::in_memory("vahan").unwrap();
        let records = monthly_records(3, 10.0);
        let load = store.load(&records, "agg_table", Granularity::Monthly).unwrap();

        assert_eq!(load, StoreLoad { raw_rows: 3, aggregated_rows: 3 });
        let rows = store.read_aggregated("agg_table").unwrap();
        assert_eq!(rows, aggregate(&records, Granularity::Monthly));
    }

    #[test]
    fn test_reload_replaces_tables() {
        let mut store = AnalyticsStore::in_memory("vahan").unwrap();
        store.load(&monthly_records(5, 1.0), "t", Granularity::Monthly).unwrap();
        store.load(&monthly_records(2, 1.0), "t", Granularity::Monthly).unwrap();

        assert_eq!(store.read_aggregated("t").unwrap().len(), 2);
    }

    #[test]
    fn test_yoy_query_lags_twelve_rows() {
        let mut store = AnalyticsStore::in_memory("vahan").unwrap();
        store.load(&monthly_records(13, 500.0), "m", Granularity::Monthly).unwrap();

        let rows = store.yoy_query("m").unwrap();
        assert_eq!(rows.len(), 13);
        assert!(rows[..12].iter().all(|r| r.yoy_pct.is_none()));
        assert_eq!(rows[12].total_prev_year, Some(500.0));
        assert_eq!(rows[12].yoy_pct, Some(0.0));
    }

    #[test]
    fn test_yoy_query_zero_denominator() {
        let mut store = AnalyticsStore::in_memory("vahan").unwrap();
        let mut records = monthly_records(13, 5.0);
        records[0].registrations = 0.0;
        store.load(&records, "m", Granularity::Monthly).unwrap();

        let rows = store.yoy_query("m").unwrap();
        assert_eq!(rows[12].total_prev_year, Some(0.0));
        assert_eq!(rows[12].yoy_pct, None);
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        assert!(matches!(
            AnalyticsStore::in_memory("bad-schema"),
            Err(VahanError::InvalidIdentifier(_))
        ));
        let store = AnalyticsStore::in_memory("vahan").unwrap();
        assert!(store.table_name("t; DROP TABLE x").is_err());
    }

    #[test]
    fn test_table_names_do_not_collide() {
        let nested = AnalyticsStore::in_memory("a_b").unwrap();
        let flat = AnalyticsStore::in_memory("a").unwrap();

        assert_eq!(nested.table_name("c").unwrap(), "a_b__c");
        assert_eq!(flat.table_name("b_c").unwrap(), "a__b_c");
        assert_eq!(flat.raw_table_name("b_c").unwrap(), "a__b_c_raw");

        assert!(flat.table_name("b__c").is_err());
        assert!(flat.table_name("_c").is_err());
        assert!(flat.table_name("c_").is_err());
        assert!(flat.table_name("c_raw").is_err());
        assert!(AnalyticsStore::in_memory("a__b").is_err());
    }

    #[test]
    fn test_schemas_sharing_a_file_stay_separate() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("analytics.sqlite");

        let mut nested = AnalyticsStore::open(&path, "a_b").unwrap();
        nested.load(&monthly_records(3, 1.0), "c", Granularity::Monthly).unwrap();
        let mut flat = AnalyticsStore::open(&path, "a").unwrap();
        flat.load(&monthly_records(1, 1.0), "b_c", Granularity::Monthly).unwrap();

        assert_eq!(nested.read_aggregated("c").unwrap().len(), 3);
        assert_eq!(flat.read_aggregated("b_c").unwrap().len(), 1);
    }
}
