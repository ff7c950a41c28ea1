//! Locate `<prefix> <year>.csv` extracts in a data directory.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{Result, VahanError};

/// Finds source files by name prefix and reads the year embedded in their names.
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    prefix: String,
    year_pattern: Regex,
}

impl SourceDiscovery {
    /// Build a discovery for files named `<prefix> *.csv`.
    pub fn new(prefix: &str) -> Result<Self> {
        let year_pattern = RegexBuilder::new(&format!(r"{} (\d{{4}})", regex::escape(prefix)))
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            prefix: prefix.to_string(),
            year_pattern,
        })
    }

    /// Glob pattern matched inside the directory.
    pub fn pattern(&self) -> String {
        format!("{} *.csv", self.prefix)
    }

    /// List matching files in sorted order.
    ///
    /// A file path searches its parent directory. Zero matches is an error.
    pub fn discover(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        let dir = if path.is_file() {
            path.parent().unwrap_or_else(|| Path::new("."))
        } else {
            path
        };

        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            self.pattern()
        );

        let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VahanError::NoSources {
                dir: dir.to_path_buf(),
                pattern: self.pattern(),
            });
        }

        debug!(dir = %dir.display(), count = files.len(), "discovered sources");
        Ok(files)
    }

    /// Year embedded in a source identifier, e.g. `maker 2021.csv` gives 2021.
    pub fn year_from_name(&self, name: &str) -> Option<i32> {
        self.year_pattern
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}
