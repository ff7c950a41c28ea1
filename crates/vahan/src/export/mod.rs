//! Secondary artifacts mirroring the canonical data: CSV files and a SQLite store.

mod csv_export;
mod store;

pub use csv_export::{to_csv_string, write_csv, CsvTable};
pub use store::{AnalyticsStore, StoreConfig, StoreLoad, YoyRow, SQL_YOY_LAG};
