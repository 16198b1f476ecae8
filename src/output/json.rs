//! JSON report for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "id": 1,
//!       "hash": "ea8f163d...",
//!       "size": 5,
//!       "files": ["/photos/a.jpg", "/backup/a.jpg"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "unique_files": 1,
//!     "failed_files": 0,
//!     "skipped_entries": 0,
//!     "reclaimable_space": 5,
//!     "scan_duration_ms": 12,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000",
//!     "generated_at": "2026-01-01T12:00:00Z"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, GroupReport};
use crate::engine::ScanOutcome;
use crate::error::ExitCode;

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Group identifier
    pub id: usize,
    /// BLAKE3 digest, 64 hex characters
    pub hash: String,
    /// Size of one member in bytes, if still readable
    pub size: Option<u64>,
    /// Member paths
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a duplicate group.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            id: group.id,
            hash: group.hash_hex(),
            size: group.size(),
            files: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files that produced a result, failures included
    pub total_files: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files removable while keeping one copy per group
    pub duplicate_files: usize,
    /// Files with no duplicate
    pub unique_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Entries skipped during the walk
    pub skipped_entries: usize,
    /// Bytes removable while keeping one copy per group
    pub reclaimable_space: u64,
    /// Scan wall-clock time in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was cancelled
    pub interrupted: bool,
    /// Process exit code
    pub exit_code: i32,
    /// Machine-readable exit code name
    pub exit_code_name: String,
    /// When this report was produced
    pub generated_at: DateTime<Utc>,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups in id order
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build a report from a finished scan.
    #[must_use]
    pub fn new(report: &GroupReport, outcome: &ScanOutcome, exit_code: ExitCode) -> Self {
        let duplicates: Vec<JsonDuplicateGroup> = report
            .groups
            .iter()
            .map(JsonDuplicateGroup::from_duplicate_group)
            .collect();
        let reclaimable_space = report
            .groups
            .iter()
            .zip(&duplicates)
            .map(|(group, json)| json.size.unwrap_or(0) * group.duplicate_count() as u64)
            .sum();

        Self {
            duplicates,
            summary: JsonSummary {
                total_files: report.total_files_scanned,
                duplicate_groups: report.group_count(),
                duplicate_files: report.total_reclaimable_files,
                unique_files: report.unique_files,
                failed_files: report.failed_files,
                skipped_entries: outcome.walk_skips.len(),
                reclaimable_space,
                scan_duration_ms: outcome.duration.as_millis() as u64,
                interrupted: outcome.cancelled,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
                generated_at: Utc::now(),
            },
        }
    }

    /// Serialize to a compact string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty-printed string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
