//! Scanner module for root management, directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Ordered, de-duplicated root directory sets
//! - Sorted directory walking using jwalk
//! - Streaming content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`roots`]: The user-selected root directories
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Hasher, RootSet, Walker, WalkerConfig};
//!
//! let mut roots = RootSet::new();
//! roots.add("/home/user/Downloads");
//!
//! let walker = Walker::new(roots.freeze(), WalkerConfig::default());
//! let hasher = Hasher::new();
//! for record in walker.files() {
//!     match hasher.full_hash(&record.path) {
//!         Ok(hash) => println!("{} {}", dupescan::scanner::hash_to_hex(&hash), record.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod roots;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher, CHUNK_SIZE};
pub use roots::{FrozenRoots, RootSet};
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// Records are transient: the walker creates them and the hasher consumes
/// them. The size is not captured during the walk and is queried on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Index of the owning root within the frozen root set
    pub root_index: usize,
}

impl FileRecord {
    /// Create a new file record.
    #[must_use]
    pub fn new(path: PathBuf, root_index: usize) -> Self {
        Self { path, root_index }
    }

    /// Query the file size from the filesystem.
    ///
    /// Returns `None` if the file can no longer be stat'ed.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).map(|m| m.len()).ok()
    }
}

/// Outcome of hashing one discovered file.
///
/// A failed hash is carried as data: it is excluded from grouping but still
/// counts as a processed file.
#[derive(Debug, Clone)]
pub struct HashResult {
    /// Path of the hashed file
    pub path: PathBuf,
    /// Content digest, or the reason the file could not be read
    pub outcome: Result<Hash, HashError>,
}

impl HashResult {
    /// Create a new hash result.
    #[must_use]
    pub fn new(path: PathBuf, outcome: Result<Hash, HashError>) -> Self {
        Self { path, outcome }
    }

    /// The digest, if hashing succeeded.
    #[must_use]
    pub fn digest(&self) -> Option<&Hash> {
        self.outcome.as_ref().ok()
    }

    /// Whether hashing failed for this file.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Configuration for directory walking.
///
/// Controls filtering of discovered entries. Symbolic links are never
/// followed and never reported.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style), relative to each root.
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new walker configuration.
    ///
    /// # Arguments
    ///
    /// * `skip_hidden` - Whether to skip hidden files
    /// * `ignore_patterns` - Glob patterns to ignore
    #[must_use]
    pub fn new(skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// An entry the walker had to skip.
///
/// These never abort a walk; they only reduce the number of discovered files.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when listing a directory or stat'ing an entry.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path vanished or never existed.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other I/O failure while walking.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },
}

impl ScanError {
    /// Classify an I/O error raised for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path associated with this skip.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The file vanished between discovery and open.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
