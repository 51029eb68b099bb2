//! Filter predicates applied during traversal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::AnalysisConfig;
use crate::error::ScanError;
use crate::key::FileTypeKey;
use crate::size::SizeThreshold;

/// Check `threshold.min <= size <= threshold.max`.
pub fn is_within_size(size: u64, threshold: &SizeThreshold) -> bool {
    threshold.contains(size)
}

/// An empty include set means no type filter is configured.
pub fn is_included_type(key: &FileTypeKey, include: &HashSet<FileTypeKey>) -> bool {
    include.is_empty() || include.contains(key)
}

/// Check whether `path` equals or descends from any excluded directory.
pub fn is_excluded_path(path: &Path, exclude: &ExcludeSet) -> bool {
    exclude.matches(path)
}

/// A configured exclude directory with its canonical form, if it resolved.
#[derive(Debug, Clone)]
struct ExcludeDir {
    raw: PathBuf,
    canonical: Option<PathBuf>,
}

/// Directories excluded from traversal.
///
/// Matching is two-tier: canonical paths are compared first so symlinked or
/// relative aliases are caught; when a path cannot be canonicalized the
/// plain component-prefix test is used instead.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    dirs: Vec<ExcludeDir>,
}

impl ExcludeSet {
    /// Build the set, resolving each directory once up front.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs = dirs
            .into_iter()
            .map(|dir| {
                let raw = dir.into();
                let canonical = raw.canonicalize().ok();
                ExcludeDir { raw, canonical }
            })
            .collect();
        Self { dirs }
    }

    /// True if `path` is, or is inside, an excluded directory.
    pub fn matches(&self, path: &Path) -> bool {
        if self.dirs.is_empty() {
            return false;
        }

        if let Ok(canonical) = path.canonicalize() {
            let hit = self.dirs.iter().any(|dir| {
                dir.canonical
                    .as_deref()
                    .is_some_and(|excluded| canonical.starts_with(excluded))
            });
            if hit {
                return true;
            }
        }

        self.dirs.iter().any(|dir| path.starts_with(&dir.raw))
    }
}

/// Compiled filters for one analysis run.
#[derive(Debug, Clone)]
pub struct Filters {
    pub show_hidden: bool,
    pub threshold: SizeThreshold,
    pub include: HashSet<FileTypeKey>,
    pub exclude: ExcludeSet,
    ignore: Option<GlobSet>,
}

impl Filters {
    /// Compile filters from a validated configuration.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ScanError> {
        let include = config
            .include_types
            .iter()
            .map(|t| FileTypeKey::from_filter(t))
            .collect();

        let ignore = if config.ignore_patterns.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &config.ignore_patterns {
                let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
                    message: format!("invalid ignore pattern '{pattern}': {e}"),
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| ScanError::InvalidConfig {
                message: e.to_string(),
            })?)
        };

        Ok(Self {
            show_hidden: config.show_hidden,
            threshold: config.size_threshold,
            include,
            exclude: ExcludeSet::new(config.exclude_dirs.iter().cloned()),
            ignore,
        })
    }

    /// Check an entry against exclude directories and ignore patterns.
    pub fn should_skip_entry(&self, path: &Path, name: &str) -> bool {
        if self.ignore.as_ref().is_some_and(|set| set.is_match(name)) {
            return true;
        }
        is_excluded_path(path, &self.exclude)
    }

    pub fn within_size(&self, size: u64) -> bool {
        is_within_size(size, &self.threshold)
    }

    pub fn included(&self, key: &FileTypeKey) -> bool {
        is_included_type(key, &self.include)
    }
}
