//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use vahan::{Granularity, VehicleCategory};

/// Vahan: vehicle-registration analytics
#[derive(Parser)]
#[command(name = "vahan")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the `maker <year>.csv` extracts
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Fail on the first malformed row instead of skipping it
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the extracts and summarize what was read
    Load {
        /// List every skipped row
        #[arg(long)]
        show_skipped: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// KPIs, growth table and top manufacturers for a selection
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        /// Rows of the growth table to print
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Also write the growth table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank manufacturers for one period
    Top {
        #[command(flatten)]
        filter: FilterArgs,

        /// Period start (YYYY-MM-DD); defaults to the latest period
        #[arg(long)]
        period: Option<NaiveDate>,

        /// Number of manufacturers; defaults to the configured top_n
        #[arg(short = 'n', long = "top")]
        n: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the raw and aggregated tables into the SQLite store, optionally writing CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Store file (defaults to the configured path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Schema name prefixing the store tables
        #[arg(long)]
        schema: Option<String>,

        /// Table name inside the store
        #[arg(long)]
        table: Option<String>,

        /// Also write a table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Which table the CSV holds
        #[arg(short, long, default_value = "growth")]
        kind: ExportTable,
    },

    /// Load the store and run the 12-row-lag YoY query
    YoySql {
        /// Store file (defaults to the configured path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Table name inside the store
        #[arg(long)]
        table: Option<String>,

        /// Maximum rows to print
        #[arg(long, default_value = "200")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Selection flags shared by the analysis commands.
#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Aggregation granularity (M, Q, Y); defaults to the detected one
    #[arg(short, long)]
    pub granularity: Option<Granularity>,

    /// Vehicle categories to keep (2W, 3W, 4W, OTHER); repeatable
    #[arg(short, long = "category")]
    pub categories: Vec<VehicleCategory>,

    /// Manufacturers to keep; repeatable
    #[arg(short, long = "manufacturer")]
    pub manufacturers: Vec<String>,

    /// First period to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last period to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Start from the dashboard defaults (2W/3W/4W, top manufacturers)
    #[arg(long)]
    pub defaults: bool,
}

impl FilterArgs {
    /// True when no selection flag was given.
    pub fn is_empty(&self) -> bool {
        self.granularity.is_none()
            && self.categories.is_empty()
            && self.manufacturers.is_empty()
            && self.from.is_none()
            && self.to.is_none()
            && !self.defaults
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportTable {
    /// Canonical records
    Raw,
    /// Period totals
    Aggregated,
    /// Period totals with growth columns
    #[default]
    Growth,
    /// Quarterly series derived from monthly data
    Quarterly,
}

impl std::str::FromStr for ExportTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "canonical" => Ok(ExportTable::Raw),
            "aggregated" | "agg" => Ok(ExportTable::Aggregated),
            "growth" => Ok(ExportTable::Growth),
            "quarterly" | "q" => Ok(ExportTable::Quarterly),
            _ => Err(format!(
                "Unknown table: {}. Use raw, aggregated, growth, or quarterly.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTable::Raw => write!(f, "raw"),
            ExportTable::Aggregated => write!(f, "aggregated"),
            ExportTable::Growth => write!(f, "growth"),
            ExportTable::Quarterly => write!(f, "quarterly"),
        }
    }
}
