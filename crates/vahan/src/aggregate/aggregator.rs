//! Sum registrations per (bucket, category, manufacturer).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::schema::{AggregatedRow, CanonicalRecord, Granularity, VehicleCategory};

/// Aggregate records at the given granularity.
///
/// Each period is truncated to the start of its month, quarter or year and
/// registrations are summed per key. Records without a period have no bucket
/// and are left out. Output has one row per key, sorted by
/// (category, manufacturer, period).
pub fn aggregate(records: &[CanonicalRecord], granularity: Granularity) -> Vec<AggregatedRow> {
    let mut totals: BTreeMap<(VehicleCategory, &str, NaiveDate), f64> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        let Some(period) = record.period else {
            dropped += 1;
            continue;
        };
        let key = (
            record.vehicle_category,
            record.manufacturer.as_str(),
            granularity.bucket(period),
        );
        *totals.entry(key).or_insert(0.0) += record.registrations;
    }

    if dropped > 0 {
        debug!(dropped, "records without a period left out of aggregation");
    }

    totals
        .into_iter()
        .map(
            |((vehicle_category, manufacturer, period), total)| AggregatedRow {
                period,
                vehicle_category,
                manufacturer: manufacturer.to_string(),
                total,
            },
        )
        .collect()
}

/// Aggregate with a frequency code (`M`, `Q`, `Y` or the long names).
///
/// Unknown codes fail with [`crate::VahanError::UnsupportedFrequency`].
pub fn aggregate_code(records: &[CanonicalRecord], freq: &str) -> Result<Vec<AggregatedRow>> {
    Ok(aggregate(records, freq.parse()?))
}
