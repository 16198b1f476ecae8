//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Incremental digest bucketing as hash results arrive
//! - Duplicate group numbering and reclaimable-file accounting

pub mod groups;

pub use groups::{DuplicateGroup, GroupIndex, GroupReport};
