//! Concurrent accumulators for one analysis run.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::ScanError;
use crate::key::FileTypeKey;

/// Add to an atomic counter, failing instead of wrapping.
fn checked_add(counter: &AtomicU64, amount: u64, name: &'static str) -> Result<(), ScanError> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            current.checked_add(amount)
        })
        .map(|_| ())
        .map_err(|_| ScanError::CounterOverflow { counter: name })
}

/// Count and total size for one file type.
#[derive(Debug, Default)]
pub struct FileTypeStats {
    count: AtomicU64,
    total_bytes: AtomicU64,
}

impl FileTypeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file of `size` bytes.
    pub fn record(&self, size: u64) -> Result<(), ScanError> {
        checked_add(&self.count, 1, "File count")?;
        checked_add(&self.total_bytes, size, "Total size")
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }
}

/// Shared aggregate state for one analysis run.
///
/// Workers only ever add to it. Counters are individually atomic; pairs such
/// as `total_files`/`total_bytes` are only guaranteed consistent once
/// traversal has finished.
#[derive(Debug, Default)]
pub struct AnalysisState {
    types: DashMap<FileTypeKey, FileTypeStats>,
    total_files: AtomicU64,
    total_bytes: AtomicU64,
    hidden_files: AtomicU64,
    hidden_bytes: AtomicU64,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics before a new run.
    pub fn reset(&mut self) {
        self.types.clear();
        *self.total_files.get_mut() = 0;
        *self.total_bytes.get_mut() = 0;
        *self.hidden_files.get_mut() = 0;
        *self.hidden_bytes.get_mut() = 0;
    }

    /// Fold a visible file (or blob) into its type bucket and the totals.
    pub fn record_visible(&self, key: FileTypeKey, size: u64) -> Result<(), ScanError> {
        // Fast path avoids the write lock on the shard for existing keys.
        if let Some(stats) = self.types.get(&key) {
            stats.record(size)?;
        } else {
            self.types.entry(key).or_default().record(size)?;
        }
        checked_add(&self.total_files, 1, "Total file count")?;
        checked_add(&self.total_bytes, size, "Total size")
    }

    /// Account a hidden file that is not shown individually.
    pub fn record_hidden(&self, size: u64) -> Result<(), ScanError> {
        checked_add(&self.hidden_files, 1, "Hidden file count")?;
        checked_add(&self.hidden_bytes, size, "Hidden size")?;
        checked_add(&self.total_bytes, size, "Total size")
    }

    pub fn total_files(&self) -> u64 {
        self.total_files.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn hidden_files(&self) -> u64 {
        self.hidden_files.load(Ordering::Relaxed)
    }

    pub fn hidden_bytes(&self) -> u64 {
        self.hidden_bytes.load(Ordering::Relaxed)
    }

    /// Number of distinct file types seen.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Look up the statistics for a type as `(count, total_bytes)`.
    pub fn get(&self, key: &FileTypeKey) -> Option<(u64, u64)> {
        self.types
            .get(key)
            .map(|stats| (stats.count(), stats.total_bytes()))
    }

    /// Visit every type bucket as `(key, count, total_bytes)`.
    pub fn for_each_type(&self, mut f: impl FnMut(&FileTypeKey, u64, u64)) {
        for entry in self.types.iter() {
            let stats = entry.value();
            f(entry.key(), stats.count(), stats.total_bytes());
        }
    }
}
