//! File actions module.
//!
//! This module provides functionality for:
//! - Deleting selected files, permanently or to the system trash
//! - Moving selected files into a destination directory
//!
//! Every action is attempted independently per path: one failure never
//! aborts the batch. Results are collected into an [`ActionReport`].
//!
//! Actions must not run while a scan of the same roots is in flight; the
//! caller is responsible for sequencing them after `Completed`.
//!
//! ```no_run
//! use dupescan::actions::{delete_files, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let report = delete_files(&[PathBuf::from("/tmp/dup.txt")], &DeleteConfig::default());
//! println!("{}", report.summary("Deleted"));
//! ```

pub mod delete;
pub mod relocate;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use delete::{delete_files, validate_preserves_copy, DeleteConfig};
pub use relocate::{move_files, CollisionPolicy, MoveConfig};

/// Error for a single path in a delete or move batch.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The source file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The operation was not permitted.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The move destination is missing or is not a directory.
    #[error("destination is not a directory: {0}")]
    DestinationMissing(PathBuf),

    /// A file with the same name already exists at the destination.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// The source path has no usable file name.
    #[error("path has no file name: {0}")]
    InvalidFileName(PathBuf),

    /// Every copy of a duplicate group was selected.
    #[error("cannot remove all copies - at least one file must be preserved")]
    AllCopiesSelected,

    /// Moving to the system trash failed.
    #[error("trash operation failed for {path}: {message}")]
    Trash {
        /// Path being trashed
        path: PathBuf,
        /// Message from the platform trash implementation
        message: String,
    },

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::DestinationMissing(p)
            | Self::DestinationExists(p)
            | Self::InvalidFileName(p)
            | Self::Trash { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesSelected => None,
        }
    }
}

/// One failed path in a batch.
#[derive(Debug)]
pub struct ActionFailure {
    /// The path the action was attempted on
    pub path: PathBuf,
    /// Why it failed
    pub error: ActionError,
}

impl Serialize for ActionFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ActionFailure", 2)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("error", &self.error.to_string())?;
        s.end()
    }
}

/// Per-path results of a delete or move batch.
#[derive(Debug, Default, Serialize)]
pub struct ActionReport {
    /// Paths acted on successfully (the source paths)
    pub succeeded: Vec<PathBuf>,
    /// Paths that failed, with reasons
    pub failures: Vec<ActionFailure>,
    /// Bytes affected by successful actions
    pub bytes: u64,
}

impl ActionReport {
    /// Number of successful actions.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of failed actions.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted actions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Check if every action succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary, e.g. `"Deleted 3 file(s), 1 failed, 2.0 KiB"`.
    #[must_use]
    pub fn summary(&self, verb: &str) -> String {
        let size = bytesize::ByteSize::b(self.bytes);
        if self.all_succeeded() {
            format!("{} {} file(s), {}", verb, self.succeeded_count(), size)
        } else {
            format!(
                "{} {} file(s), {} failed, {}",
                verb,
                self.succeeded_count(),
                self.failed_count(),
                size
            )
        }
    }

    fn record(&mut self, path: &Path, result: Result<u64, ActionError>, verb: &str) {
        match result {
            Ok(bytes) => {
                self.bytes += bytes;
                self.succeeded.push(path.to_path_buf());
            }
            Err(error) => {
                log::warn!("Failed to {} {}: {}", verb, path.display(), error);
                self.failures.push(ActionFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }
}
