//! Main Pipeline struct and public API.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{aggregate, top_n, ManufacturerTotal};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::{AnalyticsStore, StoreConfig, StoreLoad};
use crate::growth::{compute_growth, GrowthOutput, Kpis};
use crate::normalize::{LoadResult, Normalizer};
use crate::schema::{AggregatedRow, Granularity};
use crate::selection::Selection;

/// Everything a dashboard view shows for one selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Granularity the selection was aggregated at.
    pub granularity: Granularity,
    /// Canonical records that passed the selection.
    pub records_selected: usize,
    pub aggregated: Vec<AggregatedRow>,
    pub growth: GrowthOutput,
    pub kpis: Kpis,
    /// Top manufacturers in the latest period.
    pub top_manufacturers: Vec<ManufacturerTotal>,
}

impl Report {
    /// True when the selection matched nothing.
    pub fn is_empty(&self) -> bool {
        self.aggregated.is_empty()
    }

    /// Most recent period in the report.
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.kpis.latest_period
    }
}

/// Load, filter, aggregate and analyze registration extracts.
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::with_config(config.normalizer.clone())?;
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured data directory.
    pub fn load(&self) -> Result<LoadResult> {
        self.load_from(&self.config.data_dir)
    }

    /// Load every matching extract under `path` (a directory or a file inside one).
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<LoadResult> {
        self.normalizer.load(path)
    }

    /// Filter, aggregate and compute growth for a loaded table.
    ///
    /// The selection's granularity wins over the detected one.
    pub fn report(&self, load: &LoadResult, selection: &Selection) -> Report {
        let granularity = selection.granularity_or(load.metadata.granularity);
        let selected = selection.apply(&load.records);
        let aggregated = aggregate(&selected, granularity);
        let growth = compute_growth(&aggregated, granularity);
        let kpis = Kpis::compute(&growth, granularity);

        let top_manufacturers = kpis
            .latest_period
            .map(|period| top_n(&aggregated, period, self.config.top_n))
            .unwrap_or_default();

        info!(
            granularity = %granularity,
            selected = selected.len(),
            aggregated = aggregated.len(),
            "built report"
        );

        Report {
            granularity,
            records_selected: selected.len(),
            aggregated,
            growth,
            kpis,
            top_manufacturers,
        }
    }

    /// Report using the configured selection.
    pub fn default_report(&self, load: &LoadResult) -> Report {
        self.report(load, &self.config.selection)
    }

    /// Top manufacturers for an arbitrary period of a report.
    pub fn top_manufacturers(&self, report: &Report, period: NaiveDate) -> Vec<ManufacturerTotal> {
        top_n(&report.aggregated, period, self.config.top_n)
    }

    /// Mirror a load into the configured analytic store.
    pub fn store(&self, load: &LoadResult, granularity: Option<Granularity>) -> Result<StoreLoad> {
        self.store_into(load, &self.config.store, granularity)
    }

    /// Mirror a load into the store described by `config`.
    ///
    /// `granularity` defaults to the detected one.
    pub fn store_into(
        &self,
        load: &LoadResult,
        config: &StoreConfig,
        granularity: Option<Granularity>,
    ) -> Result<StoreLoad> {
        let granularity = granularity.unwrap_or(load.metadata.granularity);
        let mut store = AnalyticsStore::from_config(config)?;
        debug!(path = %config.path.display(), "opened analytic store");
        store.load(&load.records, &config.table, granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VehicleCategory;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn pipeline() -> Pipeline {
        Pipeline::new().unwrap()
    }

    #[test]
    fn test_yearly_report() {
        let dir = TempDir::new().unwrap();
        write(&dir, "maker 2021.csv", "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,1000\n");
        write(&dir, "maker 2022.csv", "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,\"1,100\"\n");

        let p = pipeline();
        let load = p.load_from(dir.path()).unwrap();
        let report = p.report(&load, &Selection::new());

        assert_eq!(report.granularity, Granularity::Yearly);
        assert_eq!(report.aggregated.len(), 2);
        let last = &report.growth.rows[1];
        assert_eq!(last.vehicle_category, VehicleCategory::TwoWheeler);
        assert!((last.yoy_pct.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(last.pop_pct, last.yoy_pct);
        assert_eq!(report.kpis.latest_total, 1100.0);
        assert_eq!(report.top_manufacturers[0].manufacturer, "Acme");
    }

    #[test]
    fn test_empty_selection_result() {
        let dir = TempDir::new().unwrap();
        write(&dir, "maker 2021.csv", "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,10\n");

        let p = pipeline();
        let load = p.load_from(dir.path()).unwrap();
        let selection = Selection::new().with_manufacturers(["Nobody"]);
        let report = p.report(&load, &selection);

        assert!(report.is_empty());
        assert_eq!(report.latest_period(), None);
        assert!(report.top_manufacturers.is_empty());
    }

    #[test]
    fn test_granularity_override() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "maker 2021.csv",
            "Maker,Vehicle_Category,Month,Total\nAcme,Car,1,10\nAcme,Car,2,20\nAcme,Car,4,30\n",
        );

        let p = pipeline();
        let load = p.load_from(dir.path()).unwrap();
        assert_eq!(load.metadata.granularity, Granularity::Monthly);

        let report = p.report(&load, &Selection::new().with_granularity(Granularity::Quarterly));
        assert_eq!(report.granularity, Granularity::Quarterly);
        assert_eq!(report.aggregated.len(), 2);
        assert_eq!(report.aggregated[0].total, 30.0);
    }

    #[test]
    fn test_default_report_uses_configured_selection() {
        let dir = TempDir::new().unwrap();
        write(&dir, "maker 2021.csv", "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,10\nBolt,Bus,20\n");
        write(&dir, "maker 2022.csv", "Maker,Vehicle_Category,Total\nAcme,Two Wheeler,30\nBolt,Bus,5\n");

        let mut config = PipelineConfig::default();
        config.selection = Selection::new().with_categories([VehicleCategory::TwoWheeler]);
        config.top_n = 1;
        let p = Pipeline::with_config(config).unwrap();
        let load = p.load_from(dir.path()).unwrap();

        let report = p.default_report(&load);
        assert_eq!(report.records_selected, 2);
        assert_eq!(report.kpis.latest_total, 30.0);

        let everything = p.report(&load, &Selection::new());
        let first_year = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let ranked = p.top_manufacturers(&everything, first_year);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].manufacturer, "Bolt");
    }

    #[test]
    fn test_store_mirror() {
        let dir = TempDir::new().unwrap();
        write(&dir, "maker 2021.csv", "Maker,Vehicle_Category,Total\nAcme,Bus,5\nBolt,Bus,7\n");

        let mut config = PipelineConfig::default();
        config.store.path = dir.path().join("db").join("analytics.sqlite");
        let p = Pipeline::with_config(config).unwrap();
        let load = p.load_from(dir.path()).unwrap();

        let written = p.store(&load, None).unwrap();
        assert_eq!(written.raw_rows, 2);
        assert_eq!(written.aggregated_rows, 2);
        assert!(dir.path().join("db").join("analytics.sqlite").exists());
    }
}
