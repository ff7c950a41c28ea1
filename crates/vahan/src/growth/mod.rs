//! Trailing-window growth metrics over aggregated series.

mod engine;
mod kpi;

pub use engine::{compute_growth, percent_change, GrowthOutput};
pub use kpi::Kpis;
