//! CLI command implementations.

pub mod export;
pub mod load;
pub mod report;
pub mod top;
pub mod yoy_sql;

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;
use vahan::export::StoreConfig;
use vahan::{LoadResult, Pipeline, PipelineConfig, Selection};

use crate::cli::{Cli, FilterArgs};

/// Command-line overrides for the analytic store.
#[derive(Debug, Clone, Default)]
pub struct StoreArgs {
    pub db: Option<PathBuf>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl StoreArgs {
    /// The configured store with any flags applied.
    pub fn resolve(self, base: &StoreConfig) -> StoreConfig {
        StoreConfig {
            path: self.db.unwrap_or_else(|| base.path.clone()),
            schema: self.schema.unwrap_or_else(|| base.schema.clone()),
            table: self.table.unwrap_or_else(|| base.table.clone()),
        }
    }
}

/// State shared by every command: the configured pipeline.
pub struct Context {
    pub pipeline: Pipeline,
    pub verbose: bool,
}

impl Context {
    /// Build from global flags; `--data-dir` overrides the config file.
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match &cli.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }
        if cli.strict {
            config.normalizer.strict = true;
        }
        debug!(data_dir = %config.data_dir.display(), top_n = config.top_n, "resolved config");

        Ok(Self {
            pipeline: Pipeline::with_config(config)?,
            verbose: cli.verbose,
        })
    }

    pub fn load(&self) -> Result<LoadResult, Box<dyn std::error::Error>> {
        Ok(self.pipeline.load()?)
    }

    /// Resolve command-line filters against the loaded table.
    ///
    /// `--defaults` starts from the dashboard defaults, otherwise from the
    /// configured selection; explicit flags replace the matching field.
    pub fn selection(&self, filter: &FilterArgs, load: &LoadResult) -> Selection {
        let mut selection = if filter.defaults {
            Selection::defaults_for(&load.records, self.pipeline.config().top_n)
        } else {
            self.pipeline.config().selection.clone()
        };

        if let Some(granularity) = filter.granularity {
            selection = selection.with_granularity(granularity);
        }
        if !filter.categories.is_empty() {
            selection = selection.with_categories(filter.categories.iter().copied());
        }
        if !filter.manufacturers.is_empty() {
            selection = selection.with_manufacturers(filter.manufacturers.iter().cloned());
        }
        if filter.from.is_some() || filter.to.is_some() {
            selection = selection.with_period_range(
                filter.from.unwrap_or(NaiveDate::MIN),
                filter.to.unwrap_or(NaiveDate::MAX),
            );
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;
    use vahan::{Granularity, VehicleCategory};

    fn context(dir: &TempDir, extra: &[&str]) -> (Context, crate::cli::Commands) {
        let data_dir = dir.path().to_string_lossy().to_string();
        let mut args = vec!["vahan", "--data-dir", data_dir.as_str()];
        args.extend_from_slice(extra);
        let cli = Cli::try_parse_from(args).unwrap();
        let ctx = Context::from_cli(&cli).unwrap();
        (ctx, cli.command)
    }

    fn filter_of(command: crate::cli::Commands) -> FilterArgs {
        match command {
            crate::cli::Commands::Report { filter, .. } => filter,
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_selection_from_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("maker 2021.csv"),
            "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,10\nBolt,Bus,20\n",
        )
        .unwrap();

        let (ctx, command) = context(&dir, &["report", "-g", "y", "-c", "OTHER", "--to", "2021-12-31"]);
        let load = ctx.load().unwrap();
        let selection = ctx.selection(&filter_of(command), &load);

        assert_eq!(selection.granularity, Some(Granularity::Yearly));
        assert_eq!(selection.apply(&load.records).len(), 1);
        assert_eq!(
            selection.period_range.map(|(_, end)| end),
            NaiveDate::from_ymd_opt(2021, 12, 31)
        );
    }

    #[test]
    fn test_defaults_flag() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("maker 2021.csv"),
            "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,10\nBolt,Bus,20\n",
        )
        .unwrap();

        let (ctx, command) = context(&dir, &["report", "--defaults"]);
        let load = ctx.load().unwrap();
        let selection = ctx.selection(&filter_of(command), &load);

        assert_eq!(
            selection.categories.into_iter().collect::<Vec<_>>(),
            vec![VehicleCategory::TwoWheeler]
        );
        assert_eq!(selection.manufacturers.len(), 2);
    }

    #[test]
    fn test_store_args_override() {
        let base = StoreConfig::default();
        let resolved = StoreArgs {
            db: Some(PathBuf::from("x.sqlite")),
            schema: None,
            table: Some("t".to_string()),
        }
        .resolve(&base);

        assert_eq!(resolved.path, PathBuf::from("x.sqlite"));
        assert_eq!(resolved.schema, "vahan");
        assert_eq!(resolved.table, "t");
    }

    #[test]
    fn test_strict_flag_reaches_normalizer() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("maker 2021.csv"),
            "Maker,Vehicle_Category,Total\nAcme,Car,1,extra\n",
        )
        .unwrap();

        let (lenient, _) = context(&dir, &["load"]);
        assert_eq!(lenient.load().unwrap().skipped_count(), 1);

        let (strict, _) = context(&dir, &["--strict", "load"]);
        assert!(strict.load().is_err());
    }

    #[test]
    fn test_missing_data_dir_fails_load() {
        let dir = TempDir::new().unwrap();
        let (ctx, _) = context(&dir, &["load"]);
        assert!(ctx.load().is_err());
    }
}
