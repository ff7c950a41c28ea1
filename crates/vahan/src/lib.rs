//! Vahan: registration analytics for vehicle-registration extracts.
//!
//! Yearly (or finer) CSV extracts of registrations by manufacturer and vehicle
//! type are normalized into one canonical table, bucketed by period, and
//! annotated with YoY / QoQ growth per (category, manufacturer) series.
//!
//! # Core Principles
//!
//! - **One canonical table**: every source reconciles to the same five columns
//! - **Positional growth**: change is measured against the row `k` places back
//! - **No silent failure**: dropped rows and missing denominators are reported
//!
//! # Example
//!
//! ```no_run
//! use vahan::{Pipeline, Selection};
//!
//! let pipeline = Pipeline::new().unwrap();
//! let load = pipeline.load_from("data").unwrap();
//! let report = pipeline.report(&load, &Selection::new());
//!
//! println!("Latest total: {}", report.kpis.latest_total);
//! println!("Skipped rows: {}", load.skipped_count());
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod growth;
pub mod input;
pub mod normalize;
pub mod schema;
pub mod selection;

mod pipeline;

pub use crate::pipeline::{Pipeline, Report};
pub use aggregate::{aggregate, top_n, ManufacturerTotal};
pub use config::PipelineConfig;
pub use error::{Result, VahanError};
pub use growth::{compute_growth, GrowthOutput, Kpis};
pub use normalize::{classify, LoadResult, Normalizer, NormalizerConfig};
pub use schema::{AggregatedRow, CanonicalRecord, Granularity, GrowthRow, VehicleCategory};
pub use selection::Selection;
