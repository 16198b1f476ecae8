//! Moving files into a destination directory.
//!
//! Each file keeps its base name. What happens when the destination already
//! holds that name is decided by [`CollisionPolicy`]; the default refuses to
//! touch the existing file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::delete::file_size;
use super::{ActionError, ActionReport};

/// Behaviour when the destination already contains the file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave both files alone and report `DestinationExists`.
    #[default]
    Skip,
    /// Replace the existing destination file.
    Overwrite,
    /// Pick a free name such as `report (1).txt`.
    Rename,
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// Configuration for moves.
#[derive(Debug, Clone, Default)]
pub struct MoveConfig {
    /// Name collision handling.
    pub on_collision: CollisionPolicy,
}

impl MoveConfig {
    /// Config with the given collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }
}

/// Move every path in `paths` into `destination`, continuing past failures.
///
/// If `destination` is not an existing directory every path fails with
/// `DestinationMissing`.
#[must_use]
pub fn move_files(paths: &[PathBuf], destination: &Path, config: &MoveConfig) -> ActionReport {
    let mut report = ActionReport::default();
    let dest_ok = destination.is_dir();
    if !dest_ok {
        log::error!("Move destination is not a directory: {}", destination.display());
    }

    for path in paths {
        let result = if dest_ok {
            move_one(path, destination, config.on_collision)
        } else {
            Err(ActionError::DestinationMissing(destination.to_path_buf()))
        };
        report.record(path, result, "move");
    }

    log::info!("{}", report.summary("Moved"));
    report
}

fn move_one(source: &Path, destination: &Path, policy: CollisionPolicy) -> Result<u64, ActionError> {
    let size = file_size(source)?;
    let name = source
        .file_name()
        .ok_or_else(|| ActionError::InvalidFileName(source.to_path_buf()))?;
    let mut target = destination.join(name);

    if target.symlink_metadata().is_ok() {
        if is_same_file(source, &target) {
            return Err(ActionError::DestinationExists(target));
        }
        match policy {
            CollisionPolicy::Skip => return Err(ActionError::DestinationExists(target)),
            CollisionPolicy::Overwrite => {
                if target.is_dir() {
                    return Err(ActionError::DestinationExists(target));
                }
                log::debug!("Overwriting {}", target.display());
                fs::remove_file(&target).map_err(|e| ActionError::from_io(&target, e))?;
            }
            CollisionPolicy::Rename => {
                target = free_name(destination, Path::new(name))
                    .ok_or_else(|| ActionError::DestinationExists(target.clone()))?;
            }
        }
    }

    rename_or_copy(source, &target)?;
    log::info!("Moved {} -> {}", source.display(), target.display());
    Ok(size)
}

/// Rename, falling back to copy then remove when crossing filesystems.
fn rename_or_copy(source: &Path, target: &Path) -> Result<(), ActionError> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Cross-device move, copying {} -> {}",
                source.display(),
                target.display()
            );
            if let Err(e) = fs::copy(source, target) {
                discard_partial_copy(target);
                return Err(ActionError::from_io(target, e));
            }
            if let Err(e) = fs::remove_file(source) {
                // Keep exactly one copy.
                discard_partial_copy(target);
                return Err(ActionError::from_io(source, e));
            }
            Ok(())
        }
        Err(e) => Err(ActionError::from_io(source, e)),
    }
}

/// Remove a copy left behind by a failed cross-device move.
fn discard_partial_copy(target: &Path) {
    match fs::remove_file(target) {
        Ok(()) => log::debug!("Removed partial copy {}", target.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "Could not remove {} after a failed move, the file now exists twice: {}",
            target.display(),
            e
        ),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// First `stem (n).ext` in `dir` that does not exist yet.
fn free_name(dir: &Path, name: &Path) -> Option<PathBuf> {
    let stem = name.file_stem()?.to_string_lossy().into_owned();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1..10_000u32)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|candidate| candidate.symlink_metadata().is_err())
}
