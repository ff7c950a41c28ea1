//! Export command - load the analytic store and optionally write one table to CSV.

use std::path::PathBuf;

use colored::Colorize;
use vahan::export::{write_csv, AnalyticsStore};

use super::{Context, StoreArgs};
use crate::cli::{ExportTable, FilterArgs};

pub fn run(
    ctx: &Context,
    filter: FilterArgs,
    store: StoreArgs,
    csv: Option<PathBuf>,
    kind: ExportTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = ctx.load()?;
    let config = store.resolve(&ctx.pipeline.config().store);

    let loaded = ctx.pipeline.store_into(&load, &config, filter.granularity)?;
    let store = AnalyticsStore::from_config(&config)?;
    println!(
        "{} {} raw / {} aggregated rows into {} ({}, {})",
        "Loaded".green().bold(),
        loaded.raw_rows,
        loaded.aggregated_rows,
        config.path.display(),
        store.raw_table_name(&config.table)?,
        store.table_name(&config.table)?
    );

    let Some(output) = csv else {
        return Ok(());
    };

    let selection = ctx.selection(&filter, &load);
    let written = match kind {
        ExportTable::Raw => {
            let records = selection.apply(&load.records);
            write_csv(&records, &output)?;
            records.len()
        }
        ExportTable::Aggregated => {
            let report = ctx.pipeline.report(&load, &selection);
            write_csv(&report.aggregated, &output)?;
            report.aggregated.len()
        }
        ExportTable::Growth => {
            let report = ctx.pipeline.report(&load, &selection);
            write_csv(&report.growth.rows, &output)?;
            report.growth.rows.len()
        }
        ExportTable::Quarterly => {
            let report = ctx.pipeline.report(&load, &selection);
            let quarters = report.growth.quarterly.unwrap_or_default();
            if quarters.is_empty() {
                eprintln!(
                    "{} quarterly series only exists for monthly data",
                    "Warning:".yellow().bold()
                );
            }
            write_csv(&quarters, &output)?;
            quarters.len()
        }
    };

    println!(
        "{} {} rows ({}) to {}",
        "Wrote".green().bold(),
        written,
        kind,
        output.display()
    );

    Ok(())
}
