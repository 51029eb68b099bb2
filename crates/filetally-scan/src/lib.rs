//! Directory traversal engine for filetally.
//!
//! This crate walks a directory tree exactly once per directory, applies
//! the configured filters and folds every regular file into a shared,
//! thread-safe per-type accumulator.
//!
//! # Overview
//!
//! - **Parallel traversal** on a bounded rayon pool, with a join barrier
//!   per directory level
//! - **Directory dedup** via a concurrent visited set, so symlinked
//!   aliases are counted once
//! - **Version-control directories** (`.git`) sized as a single blob
//! - **Partial-failure tolerance**: unreadable entries become warnings
//!
//! # Example
//!
//! ```rust,no_run
//! use filetally_scan::{AnalysisConfig, TypeScanner};
//!
//! let config = AnalysisConfig::new("/path/to/analyze");
//! let mut scanner = TypeScanner::new(config).unwrap();
//! let snapshot = scanner.analyze().unwrap();
//!
//! for row in &snapshot.rows {
//!     println!("{}: {} files, {} bytes", row.key, row.count, row.total_bytes);
//! }
//! ```

mod scanner;
mod visited;

pub use scanner::TypeScanner;
pub use visited::{DirIdentity, VisitedSet};

// Re-export core types for convenience
pub use filetally_core::{
    AnalysisConfig, AnalysisState, FileTypeKey, ScanError, ScanWarning, SizeThreshold, Snapshot,
    TypeRow, WarningKind,
};
