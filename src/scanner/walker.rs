//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing every root of a
//! [`FrozenRoots`] and yielding one [`FileRecord`] per regular file.
//!
//! # Features
//!
//! - Parallel directory reading with sorted, deterministic output order
//! - Nested or repeated roots are walked once
//! - Paths are de-duplicated across the whole walk
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden file filtering
//! - Symbolic links are never followed
//!
//! Unreadable entries are yielded as [`ScanError`] values and never stop the
//! walk. Use [`Walker::files`] to drop them silently.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{RootSet, Walker, WalkerConfig};
//!
//! let roots: RootSet = ["/home/user/Pictures", "/media/backup"].into_iter().collect();
//! let walker = Walker::new(roots.freeze(), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}", file.path.display()),
//!         Err(e) => eprintln!("Skipped: {}", e),
//!     }
//! }
//! ```

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileRecord, FrozenRoots, ScanError, WalkerConfig};

type EntryIter = Box<dyn Iterator<Item = Result<jwalk::DirEntry<((), ())>, jwalk::Error>> + Send>;

/// Directory walker over a frozen set of roots.
#[derive(Debug, Clone)]
pub struct Walker {
    roots: FrozenRoots,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker.
    ///
    /// # Arguments
    ///
    /// * `roots` - Root directories to scan, in order
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(roots: FrozenRoots, config: WalkerConfig) -> Self {
        Self { roots, config }
    }

    /// Roots this walker visits.
    #[must_use]
    pub fn roots(&self) -> &FrozenRoots {
        &self.roots
    }

    /// Walk every root, yielding file records and skipped entries.
    ///
    /// Each call starts a fresh traversal.
    pub fn walk(&self) -> WalkIter {
        let (plan, errors) = plan_roots(self.roots.as_slice());
        WalkIter {
            config: self.config.clone(),
            plan: plan.into(),
            pending_errors: errors.into(),
            current: None,
            seen: HashSet::new(),
        }
    }

    /// Walk every root, yielding only the discovered files.
    pub fn files(&self) -> impl Iterator<Item = FileRecord> {
        self.walk().filter_map(Result::ok)
    }
}

/// A root that survived overlap elimination.
#[derive(Debug, Clone)]
struct PlannedRoot {
    index: usize,
    path: PathBuf,
}

/// Canonicalize roots and drop those already covered by another root.
fn plan_roots(roots: &[PathBuf]) -> (Vec<PlannedRoot>, Vec<ScanError>) {
    let mut errors = Vec::new();
    let mut resolved: Vec<PlannedRoot> = Vec::with_capacity(roots.len());

    for (index, root) in roots.iter().enumerate() {
        let canonical = match root.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping root {}: {}", root.display(), e);
                errors.push(ScanError::from_io(root, e));
                continue;
            }
        };
        if !canonical.is_dir() {
            log::warn!("Skipping root {}: not a directory", root.display());
            errors.push(ScanError::NotADirectory(root.clone()));
            continue;
        }
        if resolved.iter().any(|r| r.path == canonical) {
            log::debug!("Skipping repeated root: {}", root.display());
            continue;
        }
        resolved.push(PlannedRoot {
            index,
            path: canonical,
        });
    }

    let plan = resolved
        .iter()
        .filter(|candidate| {
            let nested = resolved
                .iter()
                .any(|other| other.path != candidate.path && candidate.path.starts_with(&other.path));
            if nested {
                log::debug!(
                    "Root {} is nested in another root, walking it once",
                    candidate.path.display()
                );
            }
            !nested
        })
        .cloned()
        .collect();

    (plan, errors)
}

/// Build the gitignore matcher for one root.
fn build_gitignore(root: &Path, patterns: &[String]) -> Option<Gitignore> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        if let Err(e) = builder.add_line(None, pattern) {
            log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
        }
    }

    match builder.build() {
        Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to build ignore patterns: {}", e);
            None
        }
    }
}

/// Lazy iterator returned by [`Walker::walk`].
pub struct WalkIter {
    config: WalkerConfig,
    plan: VecDeque<PlannedRoot>,
    pending_errors: VecDeque<ScanError>,
    current: Option<(usize, EntryIter)>,
    seen: HashSet<PathBuf>,
}

impl std::fmt::Debug for WalkIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkIter")
            .field("remaining_roots", &self.plan.len())
            .field("seen", &self.seen.len())
            .finish()
    }
}

impl WalkIter {
    fn open_root(&self, root: &Path) -> EntryIter {
        let gitignore = build_gitignore(root, &self.config.ignore_patterns);

        let walk_dir = WalkDir::new(root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                if let Some(gi) = &gitignore {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let ignored = gi
                                .matched(entry.path(), entry.file_type().is_dir())
                                .is_ignore();
                            if ignored {
                                log::trace!("Ignoring: {}", entry.path().display());
                            }
                            !ignored
                        }
                        Err(_) => true,
                    });
                }
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Box::new(walk_dir.into_iter())
    }

    fn convert(
        &mut self,
        root_index: usize,
        entry: Result<jwalk::DirEntry<((), ())>, jwalk::Error>,
    ) -> Option<Result<FileRecord, ScanError>> {
        match entry {
            Ok(mut entry) => {
                // jwalk reports an unreadable directory on the directory entry itself
                if let Some(error) = entry.read_children_error.take() {
                    return Some(Err(convert_jwalk_error(error, &entry.path())));
                }
                if entry.depth == 0 {
                    return None;
                }

                let file_type = entry.file_type();
                if file_type.is_symlink() {
                    log::trace!("Skipping symlink: {}", entry.path().display());
                    return None;
                }
                if !file_type.is_file() {
                    return None;
                }

                let path = entry.path();
                if !self.seen.insert(path.clone()) {
                    log::trace!("Already discovered: {}", path.display());
                    return None;
                }

                Some(Ok(FileRecord::new(path, root_index)))
            }
            Err(e) => Some(Err(convert_jwalk_error(e, Path::new("")))),
        }
    }
}

/// Map a jwalk error onto a walk skip, using `fallback` when the error
/// carries no path.
fn convert_jwalk_error(error: jwalk::Error, fallback: &Path) -> ScanError {
    let path = error
        .path()
        .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    let kind = error
        .io_error()
        .map_or(io::ErrorKind::Other, io::Error::kind);
    log::debug!("Walker skipped {}: {}", path.display(), error);
    ScanError::from_io(&path, io::Error::new(kind, error.to_string()))
}

impl Iterator for WalkIter {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_errors.pop_front() {
            return Some(Err(err));
        }

        loop {
            if self.current.is_none() {
                let root = self.plan.pop_front()?;
                log::debug!("Walking root {}", root.path.display());
                let iter = self.open_root(&root.path);
                self.current = Some((root.index, iter));
            }

            let (root_index, iter) = self.current.as_mut()?;
            let root_index = *root_index;
            match iter.next() {
                Some(entry) => {
                    if let Some(item) = self.convert(root_index, entry) {
                        return Some(item);
                    }
                }
                None => self.current = None,
            }
        }
    }
}
