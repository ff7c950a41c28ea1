//! Granularity detection from a source's schema and date values.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::columns::{parse_date, ColumnIndex, DATE, MONTH, PERIOD, QUARTER};
use crate::input::DataTable;
use crate::schema::Granularity;

/// Detect the reporting cadence of one source.
///
/// A `month` column means monthly and a `quarter` column means quarterly.
/// A `period`/`date` column is judged by its values. Anything else is yearly.
pub fn detect_granularity(columns: &ColumnIndex, table: &DataTable) -> Granularity {
    if columns.contains(MONTH) {
        return Granularity::Monthly;
    }
    if columns.contains(QUARTER) {
        return Granularity::Quarterly;
    }

    let date_column = columns.position(PERIOD).or_else(|| columns.position(DATE));
    match date_column {
        Some(idx) => granularity_from_dates(
            table
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter_map(|cell| parse_date(cell)),
        ),
        None => Granularity::Yearly,
    }
}

/// Infer the coarsest granularity whose boundaries every date sits on.
///
/// All January 1st dates read as yearly, all quarter starts as quarterly,
/// anything else as monthly. No dates at all falls back to yearly.
pub fn granularity_from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Granularity {
    let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
    if distinct.is_empty() {
        return Granularity::Yearly;
    }

    if distinct.iter().all(|d| Granularity::Yearly.is_boundary(*d)) {
        Granularity::Yearly
    } else if distinct.iter().all(|d| Granularity::Quarterly.is_boundary(*d)) {
        Granularity::Quarterly
    } else {
        // Dates inside a month still bucket monthly.
        Granularity::Monthly
    }
}
