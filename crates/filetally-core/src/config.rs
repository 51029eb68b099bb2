//! Analysis configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::size::SizeThreshold;

/// Configuration for one analysis run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AnalysisConfig {
    /// Root directory to analyze.
    pub root: PathBuf,

    /// Fold hidden files into the per-type statistics instead of the
    /// hidden counters.
    #[builder(default = "false")]
    #[serde(default)]
    pub show_hidden: bool,

    /// Directories excluded together with everything below them.
    #[builder(default)]
    #[serde(default)]
    pub exclude_dirs: Vec<PathBuf>,

    /// File types to count (empty = all).
    #[builder(default)]
    #[serde(default)]
    pub include_types: Vec<String>,

    /// Glob patterns matched against entry names.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Accepted file size range.
    #[builder(default)]
    #[serde(default)]
    pub size_threshold: SizeThreshold,

    /// Number of worker threads (0 = available parallelism).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Follow symbolic links to files and directories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
}

fn default_true() -> bool {
    true
}

impl AnalysisConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Root path is required".to_string()),
        }
        if let Some(threshold) = self.size_threshold {
            if threshold.min() > threshold.max() {
                return Err(
                    "min size must be less than or equal to max size".to_string(),
                );
            }
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Create a config with default filters for a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            show_hidden: false,
            exclude_dirs: Vec::new(),
            include_types: Vec::new(),
            ignore_patterns: Vec::new(),
            size_threshold: SizeThreshold::unbounded(),
            threads: 0,
            follow_symlinks: true,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
