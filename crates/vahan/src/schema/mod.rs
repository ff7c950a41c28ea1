//! Canonical record shapes flowing through the pipeline.

mod record;
mod types;

pub use record::{AggregatedRow, CanonicalRecord, GrowthRow, PeriodTotal};
pub use types::{Granularity, VehicleCategory};
