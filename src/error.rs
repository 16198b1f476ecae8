//! Exit codes and structured error output for the binary.

use serde::Serialize;

use crate::actions::ActionReport;
use crate::duplicates::GroupReport;
use crate::engine::ScanOutcome;

/// Process exit codes.
///
/// - 0: scan completed and duplicates were found, or every action succeeded
/// - 1: fatal error
/// - 2: scan completed, no duplicates
/// - 3: some files or actions failed
/// - 130: interrupted (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates found / all actions succeeded.
    Success = 0,
    /// Fatal error.
    GeneralError = 1,
    /// No duplicates found.
    NoDuplicates = 2,
    /// Completed with per-file failures.
    PartialSuccess = 3,
    /// Interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code used in error output.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Exit code for a finished scan.
    ///
    /// Unreadable files or skipped entries downgrade a result to
    /// `PartialSuccess` only when duplicates were found; an interrupted
    /// scan always reports `Interrupted`.
    #[must_use]
    pub fn for_scan(outcome: &ScanOutcome, report: &GroupReport) -> Self {
        if outcome.cancelled {
            Self::Interrupted
        } else if !report.has_duplicates() {
            Self::NoDuplicates
        } else if outcome.hash_failures > 0 || !outcome.walk_skips.is_empty() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Exit code for a delete or move batch.
    #[must_use]
    pub fn for_actions(report: &ActionReport) -> Self {
        if report.all_succeeded() {
            Self::Success
        } else if report.succeeded_count() > 0 {
            Self::PartialSuccess
        } else {
            Self::GeneralError
        }
    }
}

/// Error description printed to stderr with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Machine-readable code (e.g. `"DS001"`)
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Error message including its causes
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build from an error and the exit code it maps to.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
