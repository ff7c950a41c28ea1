//! Vahan CLI - vehicle-registration analytics.

mod cli;
mod commands;
mod display;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::StoreArgs;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    logging::setup_logging(level);

    let result = commands::Context::from_cli(&cli).and_then(|ctx| match cli.command {
        Commands::Load { show_skipped, json } => commands::load::run(&ctx, show_skipped, json),

        Commands::Report {
            filter,
            limit,
            output,
            json,
        } => commands::report::run(&ctx, filter, limit, output, json),

        Commands::Top {
            filter,
            period,
            n,
            json,
        } => commands::top::run(&ctx, filter, period, n, json),

        Commands::Export {
            filter,
            db,
            schema,
            table,
            csv,
            kind,
        } => commands::export::run(&ctx, filter, StoreArgs { db, schema, table }, csv, kind),

        Commands::YoySql {
            db,
            table,
            limit,
            json,
        } => commands::yoy_sql::run(
            &ctx,
            StoreArgs {
                db,
                schema: None,
                table,
            },
            limit,
            json,
        ),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
