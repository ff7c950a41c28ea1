//! Rank manufacturers within one period.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::PeriodTotal;

/// Number of manufacturers returned when the caller does not say.
pub const DEFAULT_TOP_N: usize = 10;

/// A manufacturer's summed total for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerTotal {
    pub manufacturer: String,
    pub total: f64,
}

/// Top `n` manufacturers for exactly `period`, summing across categories.
///
/// A period with no rows gives an empty result. Equal totals keep their
/// grouped (alphabetical) order.
pub fn top_n<R: PeriodTotal>(rows: &[R], period: NaiveDate, n: usize) -> Vec<ManufacturerTotal> {
    let mut grouped: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.period() == period) {
        *grouped.entry(row.manufacturer()).or_insert(0.0) += row.total();
    }

    let mut ranked: Vec<ManufacturerTotal> = grouped
        .into_iter()
        .map(|(manufacturer, total)| ManufacturerTotal {
            manufacturer: manufacturer.to_string(),
            total,
        })
        .collect();

    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(n);
    ranked
}
