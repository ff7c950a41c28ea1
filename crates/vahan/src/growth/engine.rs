//! Period-over-period percentage change within each (category, manufacturer) series.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::schema::{AggregatedRow, CanonicalRecord, Granularity, GrowthRow};

/// Offset for quarter-over-quarter change.
const QOQ_OFFSET: usize = 1;

/// Enriched rows plus the quarterly series derived from monthly input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthOutput {
    /// Input rows with growth columns, sorted by (category, manufacturer, period).
    pub rows: Vec<GrowthRow>,
    /// Quarterly totals with `qoq_pct`, only for monthly input.
    pub quarterly: Option<Vec<GrowthRow>>,
}

/// `(current / previous - 1) * 100`, or `None` when `previous` is zero.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let pct = (current / previous - 1.0) * 100.0;
    pct.is_finite().then_some(pct)
}

/// Compute growth metrics for an aggregated table.
///
/// Each (category, manufacturer) series is ordered by period and compared to
/// the row `k` positions earlier:
///
/// - monthly: `yoy_pct` with k = 12, plus a quarterly series carrying `qoq_pct`
///   (k = 1) returned separately; monthly rows keep `qoq_pct` empty.
/// - quarterly: `yoy_pct` with k = 4 and `qoq_pct` with k = 1.
/// - yearly: `yoy_pct` with k = 1 and `pop_pct` equal to it.
///
/// Missing or zero denominators give `None`. Empty input comes back as-is
/// with no quarterly series.
pub fn compute_growth(aggregated: &[AggregatedRow], granularity: Granularity) -> GrowthOutput {
    if aggregated.is_empty() {
        return GrowthOutput::default();
    }

    let mut rows: Vec<GrowthRow> = aggregated.iter().map(GrowthRow::from).collect();
    sort_series(&mut rows);

    let yoy_offset = granularity.periods_per_year();
    apply_change(&mut rows, yoy_offset, |r| &mut r.yoy_pct);

    let quarterly = match granularity {
        Granularity::Monthly => Some(quarterly_series(aggregated)),
        Granularity::Quarterly => {
            apply_change(&mut rows, QOQ_OFFSET, |r| &mut r.qoq_pct);
            None
        }
        Granularity::Yearly => {
            for row in &mut rows {
                row.pop_pct = row.yoy_pct;
            }
            None
        }
    };

    debug!(
        rows = rows.len(),
        quarterly = quarterly.as_ref().map(|q| q.len()),
        granularity = %granularity,
        "computed growth"
    );

    GrowthOutput { rows, quarterly }
}

/// Sum monthly totals into quarters and attach `qoq_pct`.
fn quarterly_series(monthly: &[AggregatedRow]) -> Vec<GrowthRow> {
    let as_records: Vec<CanonicalRecord> = monthly.iter().map(CanonicalRecord::from).collect();
    let mut quarters: Vec<GrowthRow> = aggregate(&as_records, Granularity::Quarterly)
        .iter()
        .map(GrowthRow::from)
        .collect();
    apply_change(&mut quarters, QOQ_OFFSET, |r| &mut r.qoq_pct);
    quarters
}

fn sort_series(rows: &mut [GrowthRow]) {
    rows.sort_by(|a, b| {
        (a.vehicle_category, &a.manufacturer, a.period).cmp(&(
            b.vehicle_category,
            &b.manufacturer,
            b.period,
        ))
    });
}

/// Contiguous index ranges sharing (category, manufacturer). Rows must be sorted.
fn partitions(rows: &[GrowthRow]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        let boundary = i == rows.len()
            || rows[i].vehicle_category != rows[start].vehicle_category
            || rows[i].manufacturer != rows[start].manufacturer;
        if boundary {
            ranges.push(start..i);
            start = i;
        }
    }
    ranges
}

/// Write the change against the row `offset` places earlier in the same series.
fn apply_change(
    rows: &mut [GrowthRow],
    offset: usize,
    field: impl Fn(&mut GrowthRow) -> &mut Option<f64>,
) {
    for range in partitions(rows) {
        let series = &mut rows[range];
        let totals: Vec<f64> = series.iter().map(|r| r.total).collect();
        for (i, row) in series.iter_mut().enumerate() {
            *field(row) = i
                .checked_sub(offset)
                .and_then(|prev| percent_change(totals[i], totals[prev]));
        }
    }
}
