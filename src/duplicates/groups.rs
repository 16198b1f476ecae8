//! Incremental duplicate grouping by content digest.
//!
//! # Overview
//!
//! [`GroupIndex`] is a pure accumulator: it receives one [`HashResult`] per
//! processed file and buckets successful digests by value. It is always in a
//! valid state, so [`GroupIndex::finalize`] can be called at any time and
//! reflects whatever has been recorded so far.
//!
//! Buckets keep discovery order, and duplicate groups are numbered from 1 in
//! the order their bucket was first seen.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::GroupIndex;
//! use std::path::PathBuf;
//!
//! let mut index = GroupIndex::new();
//! index.record_digest(Some([1; 32]), PathBuf::from("/a.txt"));
//! index.record_digest(Some([1; 32]), PathBuf::from("/b.txt"));
//! index.record_digest(Some([2; 32]), PathBuf::from("/c.txt"));
//!
//! let report = index.finalize();
//! assert_eq!(report.total_files_scanned, 3);
//! assert_eq!(report.groups.len(), 1);
//! assert_eq!(report.total_reclaimable_files, 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{hash_to_hex, Hash, HashResult};

/// All paths sharing one digest, in discovery order.
#[derive(Debug, Clone)]
struct Bucket {
    hash: Hash,
    paths: Vec<PathBuf>,
}

/// Accumulates `(digest, path)` results into digest buckets.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    buckets: Vec<Bucket>,
    by_hash: HashMap<Hash, usize>,
    seen: HashSet<PathBuf>,
    recorded: usize,
    failed: usize,
}

impl GroupIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one hash result.
    ///
    /// Failed results are counted but never enter a bucket. A path that was
    /// already recorded is ignored, so each path lives in at most one bucket.
    pub fn record(&mut self, result: &HashResult) {
        self.record_digest(result.digest().copied(), result.path.clone());
    }

    /// Record a digest (or a failure marker, `None`) for `path`.
    pub fn record_digest(&mut self, hash: Option<Hash>, path: PathBuf) {
        if !self.seen.insert(path.clone()) {
            log::debug!("Ignoring repeated result for {}", path.display());
            return;
        }
        self.recorded += 1;

        let Some(hash) = hash else {
            self.failed += 1;
            return;
        };

        match self.by_hash.get(&hash) {
            Some(&slot) => self.buckets[slot].paths.push(path),
            None => {
                self.by_hash.insert(hash, self.buckets.len());
                self.buckets.push(Bucket {
                    hash,
                    paths: vec![path],
                });
            }
        }
    }

    /// Total results recorded, failures included.
    #[must_use]
    pub fn total_recorded(&self) -> usize {
        self.recorded
    }

    /// Number of results that carried a failure marker.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Number of distinct digests seen.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    /// Whether `path` was recorded.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    /// Iterate duplicate groups (buckets with two or more members).
    pub fn duplicate_groups(&self) -> impl Iterator<Item = DuplicateGroup> + '_ {
        self.buckets
            .iter()
            .filter(|b| b.paths.len() > 1)
            .enumerate()
            .map(|(i, b)| DuplicateGroup::new(i + 1, b.hash, b.paths.clone()))
    }

    /// Paths whose digest matched no other file.
    pub fn unique_paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.buckets
            .iter()
            .filter(|b| b.paths.len() == 1)
            .map(|b| b.paths[0].as_path())
    }

    /// Snapshot the current grouping state.
    #[must_use]
    pub fn finalize(&self) -> GroupReport {
        let groups: Vec<DuplicateGroup> = self.duplicate_groups().collect();
        let total_reclaimable_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        let unique_files = self.buckets.iter().filter(|b| b.paths.len() == 1).count();

        GroupReport {
            total_files_scanned: self.recorded,
            groups,
            total_reclaimable_files,
            unique_files,
            failed_files: self.failed,
        }
    }

    /// Drop all recorded state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A confirmed group of files with identical content digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Sequential group identifier, starting at 1
    pub id: usize,
    /// BLAKE3 digest shared by every member
    #[serde(serialize_with = "serialize_hash")]
    pub hash: Hash,
    /// Member paths in discovery order
    pub paths: Vec<PathBuf>,
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(hash))
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(id: usize, hash: Hash, paths: Vec<PathBuf>) -> Self {
        Self { id, hash, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 kept).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Size of one member, queried from the filesystem.
    ///
    /// Members share content, so any readable member gives the answer.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.paths
            .iter()
            .find_map(|p| std::fs::metadata(p).ok().map(|m| m.len()))
    }

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size()
            .map_or(0, |size| size * self.duplicate_count() as u64)
    }

    /// Whether `path` belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Grouping state read back by the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    /// Every file that produced a result, failures included
    pub total_files_scanned: usize,
    /// Buckets with two or more members
    pub groups: Vec<DuplicateGroup>,
    /// Sum over groups of `members - 1`
    pub total_reclaimable_files: usize,
    /// Files whose digest matched nothing else
    pub unique_files: usize,
    /// Files that could not be hashed
    pub failed_files: usize,
}

impl GroupReport {
    /// Number of duplicate groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Files participating in duplication (every member of every group).
    #[must_use]
    pub fn duplicated_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Look up the group containing `path`.
    #[must_use]
    pub fn group_of(&self, path: &Path) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.contains(path))
    }
}
