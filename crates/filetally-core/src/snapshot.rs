//! Immutable, sorted projection of a finished analysis run.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::ScanWarning;
use crate::key::FileTypeKey;
use crate::stats::AnalysisState;

/// One row of the per-type table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRow {
    #[serde(rename = "file_type")]
    pub key: FileTypeKey,
    pub count: u64,
    pub total_bytes: u64,
}

/// Read-only results of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Root directory that was analyzed.
    pub root: PathBuf,
    /// Per-type rows, largest total size first.
    pub rows: Vec<TypeRow>,
    pub total_files: u64,
    pub total_bytes: u64,
    pub hidden_files: u64,
    pub hidden_bytes: u64,
    /// Whether hidden files were folded into the per-type rows.
    pub show_hidden: bool,
    /// Wall-clock duration of the traversal.
    pub scan_duration: Duration,
    /// Non-fatal problems encountered during traversal.
    pub warnings: Vec<ScanWarning>,
}

impl Snapshot {
    /// Project the accumulator into sorted rows.
    ///
    /// Rows are ordered by total bytes descending; equal sizes fall back to
    /// the label so repeated runs print identically.
    pub fn from_state(
        state: &AnalysisState,
        root: PathBuf,
        show_hidden: bool,
        scan_duration: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        let mut rows = Vec::with_capacity(state.type_count());
        state.for_each_type(|key, count, total_bytes| {
            rows.push(TypeRow {
                key: key.clone(),
                count,
                total_bytes,
            });
        });
        rows.sort_by(|a, b| {
            b.total_bytes
                .cmp(&a.total_bytes)
                .then_with(|| a.key.label().cmp(b.key.label()))
        });

        Self {
            root,
            rows,
            total_files: state.total_files(),
            total_bytes: state.total_bytes(),
            hidden_files: state.hidden_files(),
            hidden_bytes: state.hidden_bytes(),
            show_hidden,
            scan_duration,
            warnings,
        }
    }

    /// Whether the hidden-files summary applies.
    pub fn has_hidden_summary(&self) -> bool {
        !self.show_hidden && self.hidden_files > 0
    }

    /// Find the row for a file type.
    pub fn row(&self, key: &FileTypeKey) -> Option<&TypeRow> {
        self.rows.iter().find(|row| &row.key == key)
    }

    /// Check if there were any warnings during traversal.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
