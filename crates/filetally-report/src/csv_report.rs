//! CSV export of a snapshot.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use tracing::debug;

use filetally_core::Snapshot;

use crate::error::ReportError;
use crate::format::format_size;

/// Label of the trailing row that carries hidden-file totals.
pub const HIDDEN_ROW_LABEL: &str = "Hidden files";

/// Writes `FileType,Count,TotalSize[,SizeHuman]` rows.
///
/// Fields containing a comma, quote or newline are quoted with internal
/// quotes doubled.
pub struct CsvReport<W: Write> {
    writer: Writer<W>,
    human_sizes: bool,
}

impl CsvReport<File> {
    /// Check that `path` looks writable without creating or truncating it.
    ///
    /// The parent directory must exist and must not be read-only, and
    /// `path` itself must not be a directory.
    pub fn check_target(path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let reject = |kind: io::ErrorKind, reason: &str| ReportError::Create {
            path: path.to_path_buf(),
            source: io::Error::new(kind, reason.to_string()),
        };

        if path.is_dir() {
            return Err(reject(io::ErrorKind::IsADirectory, "path is a directory"));
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let metadata = fs::metadata(parent).map_err(|source| ReportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(reject(io::ErrorKind::NotADirectory, "parent is not a directory"));
        }
        if metadata.permissions().readonly() {
            return Err(reject(io::ErrorKind::PermissionDenied, "parent directory is read-only"));
        }
        Ok(())
    }

    /// Create (or truncate) the output file.
    pub fn create(path: impl AsRef<Path>, human_sizes: bool) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ReportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, human_sizes))
    }
}

impl<W: Write> CsvReport<W> {
    pub fn new(inner: W, human_sizes: bool) -> Self {
        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);
        Self {
            writer,
            human_sizes,
        }
    }

    /// Write the header, one row per type in snapshot order, and the
    /// hidden-files row when hidden files were not shown individually.
    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), ReportError> {
        let mut header = vec!["FileType", "Count", "TotalSize"];
        if self.human_sizes {
            header.push("SizeHuman");
        }
        self.writer.write_record(&header)?;

        for row in &snapshot.rows {
            self.write_row(row.key.label(), row.count, row.total_bytes)?;
        }

        if snapshot.has_hidden_summary() {
            self.write_row(HIDDEN_ROW_LABEL, snapshot.hidden_files, snapshot.hidden_bytes)?;
        }

        self.writer.flush()?;
        debug!(rows = snapshot.rows.len(), "wrote CSV report");
        Ok(())
    }

    fn write_row(&mut self, label: &str, count: u64, bytes: u64) -> Result<(), ReportError> {
        let count = count.to_string();
        let bytes_str = bytes.to_string();
        if self.human_sizes {
            let human = format_size(bytes);
            self.writer
                .write_record([label, count.as_str(), bytes_str.as_str(), human.as_str()])?;
        } else {
            self.writer
                .write_record([label, count.as_str(), bytes_str.as_str()])?;
        }
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}
