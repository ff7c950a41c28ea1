//! Turn loosely-structured source tables into canonical records.

mod classify;
mod columns;
mod detect;
mod normalizer;

pub use classify::classify;
pub use columns::{normalize_column_name, parse_registrations, parse_year, ColumnIndex};
pub use detect::{detect_granularity, granularity_from_dates};
pub use normalizer::{LoadMetadata, LoadResult, NormalizedSource, Normalizer, NormalizerConfig};
