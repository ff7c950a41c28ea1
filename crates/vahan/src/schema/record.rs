//! Record types: canonical facts, aggregated rows and growth-enriched rows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::VehicleCategory;

/// A normalized registration fact.
///
/// Several records may share the same (period, category, manufacturer) key;
/// they are summed only at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Start of the reporting interval. Unset when the year could not be parsed.
    pub period: Option<NaiveDate>,
    /// Reporting year.
    pub year: Option<i32>,
    pub vehicle_category: VehicleCategory,
    /// Manufacturer name, trimmed, original casing.
    pub manufacturer: String,
    /// Registration count, never negative.
    pub registrations: f64,
}

impl CanonicalRecord {
    /// Create a record for a known period.
    pub fn new(
        period: NaiveDate,
        vehicle_category: VehicleCategory,
        manufacturer: impl Into<String>,
        registrations: f64,
    ) -> Self {
        Self {
            period: Some(period),
            year: Some(period.year()),
            vehicle_category,
            manufacturer: manufacturer.into(),
            registrations,
        }
    }
}

/// One (bucket, category, manufacturer) total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub period: NaiveDate,
    pub vehicle_category: VehicleCategory,
    pub manufacturer: String,
    pub total: f64,
}

impl From<&AggregatedRow> for CanonicalRecord {
    fn from(row: &AggregatedRow) -> Self {
        CanonicalRecord::new(
            row.period,
            row.vehicle_category,
            row.manufacturer.clone(),
            row.total,
        )
    }
}

/// An aggregated row enriched with growth metrics.
///
/// Percentages are already multiplied by 100 (`12.34` means +12.34%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub period: NaiveDate,
    pub vehicle_category: VehicleCategory,
    pub manufacturer: String,
    pub total: f64,
    pub yoy_pct: Option<f64>,
    pub qoq_pct: Option<f64>,
    pub pop_pct: Option<f64>,
}

impl From<&AggregatedRow> for GrowthRow {
    fn from(row: &AggregatedRow) -> Self {
        Self {
            period: row.period,
            vehicle_category: row.vehicle_category,
            manufacturer: row.manufacturer.clone(),
            total: row.total,
            yoy_pct: None,
            qoq_pct: None,
            pop_pct: None,
        }
    }
}

/// Rows that carry a period, a manufacturer and a total.
///
/// Lets ranking and KPI code run over aggregated and enriched tables alike.
pub trait PeriodTotal {
    fn period(&self) -> NaiveDate;
    fn vehicle_category(&self) -> VehicleCategory;
    fn manufacturer(&self) -> &str;
    fn total(&self) -> f64;
}

impl PeriodTotal for AggregatedRow {
    fn period(&self) -> NaiveDate {
        self.period
    }
    fn vehicle_category(&self) -> VehicleCategory {
        self.vehicle_category
    }
    fn manufacturer(&self) -> &str {
        &self.manufacturer
    }
    fn total(&self) -> f64 {
        self.total
    }
}

impl PeriodTotal for GrowthRow {
    fn period(&self) -> NaiveDate {
        self.period
    }
    fn vehicle_category(&self) -> VehicleCategory {
        self.vehicle_category
    }
    fn manufacturer(&self) -> &str {
        &self.manufacturer
    }
    fn total(&self) -> f64 {
        self.total
    }
}
