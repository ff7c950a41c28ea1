//! Top command - rank manufacturers within one period.

use chrono::NaiveDate;
use colored::Colorize;
use vahan::top_n;

use super::Context;
use crate::cli::FilterArgs;
use crate::display::format_big_number;

pub fn run(
    ctx: &Context,
    filter: FilterArgs,
    period: Option<NaiveDate>,
    n: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = ctx.load()?;
    let selection = ctx.selection(&filter, &load);
    let report = ctx.pipeline.report(&load, &selection);

    let period = period.or(report.latest_period());
    let ranked = period
        .map(|p| report.granularity.bucket(p))
        .map(|p| match n {
            Some(n) => top_n(&report.aggregated, p, n),
            None => ctx.pipeline.top_manufacturers(&report, p),
        })
        .unwrap_or_default();

    if json {
        let out = serde_json::json!({
            "period": period,
            "granularity": report.granularity,
            "manufacturers": ranked,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let Some(period) = period else {
        println!("{}", "No data for the current selection.".yellow());
        return Ok(());
    };

    println!(
        "{} {}",
        "Top manufacturers for".cyan().bold(),
        period.to_string().white()
    );
    if ranked.is_empty() {
        println!("  {}", "No data for this period.".yellow());
        return Ok(());
    }
    for (rank, entry) in ranked.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {}",
            rank + 1,
            entry.manufacturer,
            format_big_number(entry.total).white()
        );
    }

    Ok(())
}
