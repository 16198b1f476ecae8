//! Human-readable report.
//!
//! One row per file with its group id, file name, full path and size in
//! KB. Rows of the same group share a colour; colours cycle between groups.

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::{Color, Condition, Paint};

use crate::duplicates::{DuplicateGroup, GroupReport};
use crate::engine::ScanOutcome;

const GROUP_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

/// Text renderer for a finished scan.
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a GroupReport,
    outcome: &'a ScanOutcome,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a renderer.
    #[must_use]
    pub fn new(report: &'a GroupReport, outcome: &'a ScanOutcome) -> Self {
        Self {
            report,
            outcome,
            color: false,
        }
    }

    /// Enable or disable ANSI colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the table and summary.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let condition = if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };

        if self.report.groups.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        } else {
            writeln!(
                writer,
                "{}",
                format!("{:>5}  {:<30}  {:>10}  {}", "Group", "File Name", "Size", "Path")
                    .bold()
                    .whenever(condition)
            )?;
            for group in &self.report.groups {
                write_group(writer, group, condition)?;
            }
        }

        writeln!(writer)?;
        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let reclaimable: u64 = self
            .report
            .groups
            .iter()
            .map(DuplicateGroup::reclaimable_bytes)
            .sum();

        writeln!(
            writer,
            "Scanned {} files: {} duplicate groups, {} removable duplicates ({})",
            self.report.total_files_scanned,
            self.report.group_count(),
            self.report.total_reclaimable_files,
            ByteSize::b(reclaimable)
        )?;
        if self.report.failed_files > 0 {
            writeln!(writer, "{} files could not be read", self.report.failed_files)?;
        }
        if !self.outcome.walk_skips.is_empty() {
            writeln!(
                writer,
                "{} entries skipped while walking",
                self.outcome.walk_skips.len()
            )?;
        }
        if self.outcome.cancelled {
            writeln!(
                writer,
                "Scan interrupted after {} of {} files; results are partial",
                self.outcome.processed, self.outcome.total
            )?;
        }
        Ok(())
    }
}

fn write_group<W: Write>(writer: &mut W, group: &DuplicateGroup, condition: Condition) -> io::Result<()> {
    let color = GROUP_COLORS[(group.id.saturating_sub(1)) % GROUP_COLORS.len()];
    for path in &group.paths {
        let row = format!(
            "{:>5}  {:<30}  {:>10}  {}",
            group.id,
            file_name(path),
            size_kb(path),
            path.display()
        );
        writeln!(writer, "{}", row.fg(color).whenever(condition))?;
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whole kilobytes, or `?` if the file is gone.
fn size_kb(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(m) => format!("{} KB", m.len() / 1024),
        Err(_) => "?".to_string(),
    }
}
