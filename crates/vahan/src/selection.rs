//! Explicit filter configuration applied between normalization and aggregation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::{CanonicalRecord, Granularity, VehicleCategory};

/// Categories pre-selected when present in the data.
const DEFAULT_CATEGORIES: [VehicleCategory; 3] = [
    VehicleCategory::TwoWheeler,
    VehicleCategory::ThreeWheeler,
    VehicleCategory::FourWheeler,
];

/// Which slice of the canonical table a report covers.
///
/// Empty category or manufacturer sets do not restrict anything. The period
/// range is inclusive on both ends; records without a period fall outside
/// any range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Aggregation granularity; `None` uses the detected one.
    pub granularity: Option<Granularity>,
    pub categories: BTreeSet<VehicleCategory>,
    pub manufacturers: BTreeSet<String>,
    pub period_range: Option<(NaiveDate, NaiveDate)>,
}

impl Selection {
    /// A selection that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = VehicleCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_manufacturers<S: Into<String>>(
        mut self,
        manufacturers: impl IntoIterator<Item = S>,
    ) -> Self {
        self.manufacturers = manufacturers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_period_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period_range = Some((start, end));
        self
    }

    /// The dashboard's opening selection for a loaded table.
    ///
    /// Categories are 2W/3W/4W where present (otherwise the first three present
    /// categories); manufacturers are the `top_n` by total registrations.
    pub fn defaults_for(records: &[CanonicalRecord], top_n: usize) -> Self {
        let present: BTreeSet<VehicleCategory> =
            records.iter().map(|r| r.vehicle_category).collect();

        let mut categories: BTreeSet<VehicleCategory> = DEFAULT_CATEGORIES
            .into_iter()
            .filter(|c| present.contains(c))
            .collect();
        if categories.is_empty() {
            categories = present.into_iter().take(3).collect();
        }

        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for record in records {
            *totals.entry(record.manufacturer.as_str()).or_insert(0.0) += record.registrations;
        }
        let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            granularity: None,
            categories,
            manufacturers: ranked
                .into_iter()
                .take(top_n)
                .map(|(m, _)| m.to_string())
                .collect(),
            period_range: None,
        }
    }

    /// True if the record falls inside this selection.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&record.vehicle_category) {
            return false;
        }
        if !self.manufacturers.is_empty() && !self.manufacturers.contains(&record.manufacturer) {
            return false;
        }
        match (self.period_range, record.period) {
            (None, _) => true,
            (Some((start, end)), Some(period)) => start <= period && period <= end,
            (Some(_), None) => false,
        }
    }

    /// Filtered copy of `records`.
    pub fn apply(&self, records: &[CanonicalRecord]) -> Vec<CanonicalRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Granularity to aggregate at, given what the loader detected.
    pub fn granularity_or(&self, detected: Granularity) -> Granularity {
        self.granularity.unwrap_or(detected)
    }
}
