//! Headline figures for the latest period of a filtered selection.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::engine::{percent_change, GrowthOutput};
use crate::schema::{Granularity, PeriodTotal};

/// Latest-period totals and growth, summed over every category and manufacturer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub latest_period: Option<NaiveDate>,
    pub latest_total: f64,
    pub yoy_pct: Option<f64>,
    /// Quarter-over-quarter for monthly data, otherwise period-over-period.
    pub qoq_pct: Option<f64>,
}

impl Kpis {
    /// Compute KPIs from a growth result.
    ///
    /// Monthly YoY compares against the period exactly one year earlier; other
    /// granularities compare against the preceding period. QoQ uses the
    /// quarterly series when there is one.
    pub fn compute(output: &GrowthOutput, granularity: Granularity) -> Self {
        let series = period_totals(&output.rows);
        let Some((&latest_period, &latest_total)) = series.last_key_value() else {
            return Self::default();
        };

        let yoy_pct = if series.len() < 2 {
            None
        } else if granularity == Granularity::Monthly {
            latest_period
                .with_year(latest_period.year() - 1)
                .and_then(|p| series.get(&p))
                .and_then(|prev| percent_change(latest_total, *prev))
        } else {
            last_two_change(&series)
        };

        let qoq_pct = match output.quarterly.as_deref() {
            Some(quarters) if !quarters.is_empty() => last_two_change(&period_totals(quarters)),
            _ => last_two_change(&series),
        };

        Self {
            latest_period: Some(latest_period),
            latest_total,
            yoy_pct,
            qoq_pct,
        }
    }
}

fn period_totals<R: PeriodTotal>(rows: &[R]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        *totals.entry(row.period()).or_insert(0.0) += row.total();
    }
    totals
}

fn last_two_change(series: &BTreeMap<NaiveDate, f64>) -> Option<f64> {
    let mut recent = series.values().rev();
    let last = *recent.next()?;
    let prev = *recent.next()?;
    percent_change(last, prev)
}
