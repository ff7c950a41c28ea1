//! Bucketing canonical records into period totals, and ranking manufacturers.

mod aggregator;
mod top_n;

pub use aggregator::{aggregate, aggregate_code};
pub use top_n::{top_n, ManufacturerTotal, DEFAULT_TOP_N};
