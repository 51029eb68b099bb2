//! Fixed-width console table.

use std::fmt::Display;
use std::io::{self, Write};

use crossterm::style::{Color, Stylize, style};

use filetally_core::Snapshot;

use crate::format::{format_size, truncate};

const SUMMARY_WIDTH: usize = 60;
const TYPE_WIDTH: usize = 20;
const COUNT_WIDTH: usize = 15;
const SIZE_WIDTH: usize = 20;

const BORDER: Color = Color::Cyan;
const HEADER: Color = Color::Yellow;
const VALUE: Color = Color::Green;
const NOTICE: Color = Color::Yellow;
const EMPTY: Color = Color::Red;

/// Renders a snapshot as a summary box plus a per-type table.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    /// Create a reporter; `color` enables ANSI styling.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Write the report to `out`.
    pub fn render<W: Write>(&self, snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
        if snapshot.total_files == 0 {
            writeln!(out, "{}", self.paint("No files found.", EMPTY))?;
        } else {
            self.render_summary(snapshot, out)?;
            self.render_table(snapshot, out)?;
        }

        if snapshot.has_hidden_summary() {
            writeln!(
                out,
                "\n{}",
                self.paint(
                    format!(
                        "Hidden files: {} (Size: {})",
                        snapshot.hidden_files,
                        format_size(snapshot.hidden_bytes)
                    ),
                    NOTICE,
                )
            )?;
        }

        if snapshot.has_warnings() {
            writeln!(out, "\n{} warning(s) during scan", snapshot.warnings.len())?;
        }
        Ok(())
    }

    fn render_summary<W: Write>(&self, snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
        let rule = self.paint(format!("+{}+", "-".repeat(SUMMARY_WIDTH)), BORDER);
        let files = format!("Total files: {}", snapshot.total_files);
        let size = format!("Total size: {}", format_size(snapshot.total_bytes));

        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(
            out,
            "{}{}{}{}{}",
            self.paint("| ", BORDER),
            self.paint(format!("{files:<25}"), VALUE),
            self.paint(" | ", BORDER),
            self.paint(format!("{size:<30}"), VALUE),
            self.paint(" |", BORDER),
        )?;
        writeln!(out, "{rule}")?;
        writeln!(
            out,
            " {} in {:.2}s",
            snapshot.root.display(),
            snapshot.scan_duration.as_secs_f64()
        )?;
        writeln!(out)
    }

    fn render_table<W: Write>(&self, snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
        let rule = self.paint(
            format!(
                "+{}+{}+{}+",
                "-".repeat(TYPE_WIDTH),
                "-".repeat(COUNT_WIDTH),
                "-".repeat(SIZE_WIDTH)
            ),
            BORDER,
        );

        writeln!(out, "{rule}")?;
        self.render_row(out, " File Type", "Count", "Total Size", HEADER)?;
        writeln!(out, "{rule}")?;
        for row in &snapshot.rows {
            let label = format!(" {}", truncate(row.key.label(), TYPE_WIDTH - 1));
            self.render_row(
                out,
                &label,
                &row.count.to_string(),
                &format_size(row.total_bytes),
                VALUE,
            )?;
        }
        writeln!(out, "{rule}")
    }

    fn render_row<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        count: &str,
        size: &str,
        color: Color,
    ) -> io::Result<()> {
        let bar = self.paint("|", BORDER);
        writeln!(
            out,
            "{bar}{}{bar}{}{bar}{}{bar}",
            self.paint(format!("{label:<width$}", width = TYPE_WIDTH), color),
            self.paint(format!("{count:>width$}", width = COUNT_WIDTH), color),
            self.paint(format!("{size:>width$}", width = SIZE_WIDTH), color),
        )
    }

    /// Apply a foreground color when styling is enabled. Padding must be
    /// applied before painting so escape codes do not count toward widths.
    fn paint(&self, text: impl Display, color: Color) -> String {
        if self.color {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}
