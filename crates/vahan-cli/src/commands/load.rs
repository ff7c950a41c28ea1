//! Load command - read the extracts and summarize the canonical table.

use colored::Colorize;

use super::Context;
use crate::display::format_big_number;

pub fn run(ctx: &Context, show_skipped: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let load = ctx.load()?;
    let total: f64 = load.records.iter().map(|r| r.registrations).sum();

    if json {
        let skipped_rows = show_skipped.then_some(&load.skipped);
        let summary = serde_json::json!({
            "granularity": load.metadata.granularity,
            "records": load.records.len(),
            "registrations": total,
            "skipped": load.skipped_count(),
            "sources": load.metadata.sources,
            "skipped_rows": skipped_rows,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Loaded registration extracts".cyan().bold());
    println!();

    println!("{}", "Sources:".yellow().bold());
    for source in &load.metadata.sources {
        let year = source
            .name_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} (year {}, {} rows, {} skipped, {})",
            source.file.white(),
            year,
            source.rows_kept(),
            source.rows_skipped,
            source.granularity
        );
        if ctx.verbose {
            println!("    sha256: {}", source.hash.dimmed());
        }
    }
    println!();

    println!("Granularity:    {}", load.metadata.granularity.to_string().white().bold());
    println!("Records:        {}", load.records.len().to_string().white());
    println!("Registrations:  {}", format_big_number(total).white());

    let skipped = load.skipped_count();
    if skipped > 0 {
        println!("Skipped rows:   {}", skipped.to_string().red());
    } else {
        println!("Skipped rows:   {}", "0".green());
    }

    if show_skipped && skipped > 0 {
        println!();
        println!("{}", "Skipped:".yellow().bold());
        for row in &load.skipped {
            println!("  {}:{} {}", row.source, row.row, row.reason.dimmed());
        }
    }

    Ok(())
}
