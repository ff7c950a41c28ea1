//! YoY SQL command - load the store and run the lagged YoY query.

use colored::Colorize;
use vahan::export::AnalyticsStore;

use super::{Context, StoreArgs};
use crate::display::{format_big_number, format_pct};

pub fn run(
    ctx: &Context,
    store: StoreArgs,
    limit: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = ctx.load()?;
    let config = store.resolve(&ctx.pipeline.config().store);

    ctx.pipeline.store_into(&load, &config, None)?;
    let store = AnalyticsStore::from_config(&config)?;
    let rows = store.yoy_query(&config.table)?;

    if json {
        let shown: Vec<_> = rows.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "YoY query over".cyan().bold(),
        store.table_name(&config.table)?.white()
    );
    if load.metadata.granularity != vahan::Granularity::Monthly {
        println!(
            "  {}",
            format!(
                "note: the query lags 12 rows; data is {}",
                load.metadata.granularity
            )
            .dimmed()
        );
    }
    println!();
    println!(
        "{:<12} {:<6} {:<30} {:>12} {:>12} {:>10}",
        "period", "cat", "manufacturer", "total", "prev_year", "yoy"
    );
    for row in rows.iter().take(limit) {
        println!(
            "{:<12} {:<6} {:<30} {:>12} {:>12} {:>10}",
            row.period,
            row.vehicle_category,
            row.manufacturer,
            format_big_number(row.total),
            row.total_prev_year
                .map(format_big_number)
                .unwrap_or_else(|| "-".to_string()),
            format_pct(row.yoy_pct)
        );
    }
    if rows.len() > limit {
        println!("{}", format!("... {} more rows", rows.len() - limit).dimmed());
    }

    Ok(())
}
