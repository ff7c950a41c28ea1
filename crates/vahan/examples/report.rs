//! Example: load a data directory and print the headline report.
//!
//! ```bash
//! cargo run -p vahan --example report -- data
//! ```

use vahan::{Pipeline, Selection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());

    let pipeline = Pipeline::new()?;
    let load = pipeline.load_from(&dir)?;
    let selection = Selection::defaults_for(&load.records, pipeline.config().top_n);
    let report = pipeline.report(&load, &selection);

    println!("Sources: {}", load.metadata.sources.len());
    println!("Granularity: {}", report.granularity);
    println!("Skipped rows: {}", load.skipped_count());
    println!();

    if let Some(period) = report.latest_period() {
        println!("Latest period: {}", period);
        println!("Total: {:.0}", report.kpis.latest_total);
        match report.kpis.yoy_pct {
            Some(p) => println!("YoY: {:.2}%", p),
            None => println!("YoY: N/A"),
        }
        println!();
        for (rank, entry) in report.top_manufacturers.iter().enumerate() {
            println!("{:>2}. {} ({:.0})", rank + 1, entry.manufacturer, entry.total);
        }
    } else {
        println!("No data for the default selection.");
    }

    Ok(())
}
