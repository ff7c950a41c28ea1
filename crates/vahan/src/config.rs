//! Pipeline configuration, loadable from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::DEFAULT_TOP_N;
use crate::error::{Result, VahanError};
use crate::export::StoreConfig;
use crate::normalize::NormalizerConfig;
use crate::selection::Selection;

/// Everything a pipeline run needs besides the data itself.
///
/// Missing keys in a config file fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory searched for source extracts.
    pub data_dir: PathBuf,
    pub normalizer: NormalizerConfig,
    /// Selection used when the caller does not pass one.
    pub selection: Selection,
    /// Manufacturers returned by Top-N queries.
    pub top_n: usize,
    pub store: StoreConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            normalizer: NormalizerConfig::default(),
            selection: Selection::default(),
            top_n: DEFAULT_TOP_N,
            store: StoreConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| VahanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.normalizer.file_prefix.trim().is_empty() {
            return Err(VahanError::Config("file_prefix must not be empty".to_string()));
        }
        if self.top_n == 0 {
            return Err(VahanError::Config("top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Granularity, VehicleCategory};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.normalizer.file_prefix, "maker");
        assert!(!config.normalizer.strict);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.store.schema, "vahan");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "data_dir": "extracts",
                "normalizer": {{ "strict": true }},
                "selection": {{ "granularity": "quarterly", "categories": ["2W"] }},
                "top_n": 5
            }}"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("extracts"));
        assert!(config.normalizer.strict);
        assert_eq!(config.normalizer.file_prefix, "maker");
        assert_eq!(config.selection.granularity, Some(Granularity::Quarterly));
        assert!(config.selection.categories.contains(&VehicleCategory::TwoWheeler));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.store.table, "agg_table");
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "top_n": 0 }}"#).unwrap();
        assert!(matches!(
            PipelineConfig::from_file(file.path()),
            Err(VahanError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PipelineConfig::from_file("/nonexistent/vahan.json"),
            Err(VahanError::Io { .. })
        ));
    }
}
