//! File deletion.
//!
//! # Overview
//!
//! [`delete_files`] removes each selected path independently:
//! - permanent removal (default)
//! - move to the system trash when `use_trash` is set
//!
//! Which copy of a group survives is the caller's choice; use
//! [`validate_preserves_copy`] to guard a selection against removing every
//! member of a group.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::actions::delete::{delete_files, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/music/copy of song.mp3")];
//! let report = delete_files(&paths, &DeleteConfig::trash());
//! for failure in &report.failures {
//!     eprintln!("{}", failure.error);
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{ActionError, ActionReport};

/// Configuration for deletion.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Move to the system trash instead of removing permanently.
    pub use_trash: bool,
}

impl DeleteConfig {
    /// Config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { use_trash: false }
    }

    /// Config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self { use_trash: true }
    }
}

/// Delete every path in `paths`, continuing past failures.
///
/// Returns the succeeded paths and a typed error for each failure.
#[must_use]
pub fn delete_files(paths: &[PathBuf], config: &DeleteConfig) -> ActionReport {
    let mut report = ActionReport::default();

    for path in paths {
        let result = if config.use_trash {
            delete_to_trash(path)
        } else {
            permanent_delete(path)
        };
        report.record(path, result, "delete");
    }

    log::info!("{}", report.summary("Deleted"));
    report
}

/// Remove a regular file permanently. Returns its size.
fn permanent_delete(path: &Path) -> Result<u64, ActionError> {
    let size = file_size(path)?;
    fs::remove_file(path).map_err(|e| ActionError::from_io(path, e))?;
    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Move a regular file to the system trash. Returns its size.
fn delete_to_trash(path: &Path) -> Result<u64, ActionError> {
    let size = file_size(path)?;
    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Size of `path`, which must be a regular file.
pub(crate) fn file_size(path: &Path) -> Result<u64, ActionError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| ActionError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(ActionError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    Ok(metadata.len())
}

/// Check that `selected_paths` leaves at least one member of `group_paths`.
///
/// # Errors
///
/// Returns `AllCopiesSelected` if every copy would be removed.
///
/// # Example
///
/// ```
/// use dupescan::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![PathBuf::from("/original.txt"), PathBuf::from("/copy.txt")];
///
/// assert!(validate_preserves_copy(&group[1..], &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), ActionError> {
    let selected: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved = group_paths.iter().filter(|p| !selected.contains(p)).count();

    if preserved == 0 && !group_paths.is_empty() {
        log::error!(
            "Attempted to remove all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(ActionError::AllCopiesSelected)
    } else {
        log::debug!(
            "Selection validated: {} selected, {} preserved",
            selected_paths.len(),
            preserved
        );
        Ok(())
    }
}
