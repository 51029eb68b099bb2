//! Core types and filters for filetally.
//!
//! This crate holds the data model shared by the traversal engine and the
//! reporters: file type classification, size thresholds, filter
//! predicates, the concurrent per-type accumulator and the sorted snapshot
//! that reporters consume.

mod config;
mod error;
mod filter;
mod key;
mod size;
mod snapshot;
mod stats;

pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use filter::{ExcludeSet, Filters, is_excluded_path, is_included_type, is_within_size};
pub use key::{FileTypeKey, VCS_DIR_NAME, classify, is_hidden_name};
pub use size::{SizeThreshold, parse_size};
pub use snapshot::{Snapshot, TypeRow};
pub use stats::{AnalysisState, FileTypeStats};
