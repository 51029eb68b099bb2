//! Reporters for filetally snapshots.
//!
//! Reporters only consume a finished [`Snapshot`]; they never touch the
//! traversal engine.
//!
//! - [`ConsoleReporter`] renders a summary box and a fixed-width table,
//!   largest types first, with an optional hidden-files line
//! - [`CsvReport`] writes `FileType,Count,TotalSize[,SizeHuman]` rows with
//!   an optional trailing `Hidden files` row

mod console;
mod csv_report;
mod error;
mod format;

pub use console::ConsoleReporter;
pub use csv_report::{CsvReport, HIDDEN_ROW_LABEL};
pub use error::ReportError;
pub use format::{format_size, truncate};

// Re-export core types
pub use filetally_core::{Snapshot, TypeRow};
