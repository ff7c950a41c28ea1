//! Report command - KPIs, growth preview and top manufacturers.

use std::path::PathBuf;

use colored::Colorize;
use vahan::export::write_csv;
use vahan::{GrowthRow, Report};

use super::Context;
use crate::cli::FilterArgs;
use crate::display::{format_big_number, format_pct};

pub fn run(
    ctx: &Context,
    filter: FilterArgs,
    limit: usize,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let load = ctx.load()?;
    let report = if filter.is_empty() {
        ctx.pipeline.default_report(&load)
    } else {
        ctx.pipeline.report(&load, &ctx.selection(&filter, &load))
    };

    if let Some(path) = &output {
        write_csv(&report.growth.rows, path)?;
        eprintln!(
            "{} {} rows to {}",
            "Wrote".green().bold(),
            report.growth.rows.len(),
            path.display()
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("{}", "No data for the current selection.".yellow());
        return Ok(());
    }

    print_kpis(&report);
    print_top(&report);
    print_growth(&report.growth.rows, limit);

    if ctx.verbose {
        if let Some(quarters) = &report.growth.quarterly {
            println!();
            println!("{}", "Quarterly series:".yellow().bold());
            print_growth(quarters, limit);
        }
    }

    Ok(())
}

fn print_kpis(report: &Report) {
    let latest = report
        .latest_period()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{} {} ({})",
        "Key indicators for".cyan().bold(),
        latest.white(),
        report.granularity
    );
    println!();
    println!(
        "  Total registrations: {}",
        format_big_number(report.kpis.latest_total).white().bold()
    );
    println!("  YoY:                 {}", colored_pct(report.kpis.yoy_pct));
    println!("  QoQ / PoP:           {}", colored_pct(report.kpis.qoq_pct));
    println!();
}

fn print_top(report: &Report) {
    if report.top_manufacturers.is_empty() {
        return;
    }
    println!("{}", "Top manufacturers:".yellow().bold());
    for (rank, entry) in report.top_manufacturers.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {}",
            rank + 1,
            entry.manufacturer,
            format_big_number(entry.total)
        );
    }
    println!();
}

fn print_growth(rows: &[GrowthRow], limit: usize) {
    println!(
        "{:<12} {:<6} {:<30} {:>12} {:>10} {:>10} {:>10}",
        "period", "cat", "manufacturer", "total", "yoy", "qoq", "pop"
    );
    for row in rows.iter().take(limit) {
        println!(
            "{:<12} {:<6} {:<30} {:>12} {:>10} {:>10} {:>10}",
            row.period,
            row.vehicle_category,
            row.manufacturer,
            format_big_number(row.total),
            format_pct(row.yoy_pct),
            format_pct(row.qoq_pct),
            format_pct(row.pop_pct)
        );
    }
    if rows.len() > limit {
        println!("{}", format!("... {} more rows", rows.len() - limit).dimmed());
    }
}

fn colored_pct(pct: Option<f64>) -> colored::ColoredString {
    let text = format_pct(pct);
    match pct {
        Some(p) if p > 0.0 => text.green(),
        Some(p) if p < 0.0 => text.red(),
        _ => text.normal(),
    }
}
