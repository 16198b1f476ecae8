//! User-selected root directories.
//!
//! A [`RootSet`] is edited freely before a scan. Starting a scan freezes it
//! into a [`FrozenRoots`], which the background worker shares read-only for
//! the duration of that scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Ordered collection of distinct root directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet {
    roots: Vec<PathBuf>,
}

impl RootSet {
    /// Create an empty root set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root directory.
    ///
    /// Returns `false` if the exact path is already present.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.roots.contains(&path) {
            log::debug!("Root already selected: {}", path.display());
            return false;
        }
        self.roots.push(path);
        true
    }

    /// Remove the root at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        if index < self.roots.len() {
            Some(self.roots.remove(index))
        } else {
            None
        }
    }

    /// Remove a root by path. Returns whether it was present.
    pub fn remove_path(&mut self, path: &Path) -> bool {
        let before = self.roots.len();
        self.roots.retain(|r| r != path);
        self.roots.len() != before
    }

    /// Iterate roots in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    /// Number of roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no roots are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Snapshot the current roots for a scan.
    #[must_use]
    pub fn freeze(&self) -> FrozenRoots {
        FrozenRoots {
            roots: self.roots.clone().into(),
        }
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for RootSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.add(path);
        }
        set
    }
}

/// Immutable snapshot of a [`RootSet`], cheap to clone across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenRoots {
    roots: Arc<[PathBuf]>,
}

impl FrozenRoots {
    /// Roots in selection order.
    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Number of roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the snapshot holds no roots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
