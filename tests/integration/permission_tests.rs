//! Unreadable files and directories. Skipped when running as root, where
//! permission bits are not enforced.
#![cfg(unix)]

use dupescan::engine::begin_scan;
use dupescan::scanner::{HashError, RootSet, ScanError};
use dupescan::session::ScanSession;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::tempdir;

fn permissions_enforced(locked: &Path) -> bool {
    fs::read(locked).is_err()
}

#[test]
fn test_unreadable_file_is_counted_but_not_grouped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "same").unwrap();
    fs::write(dir.path().join("b.txt"), "same").unwrap();
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, "same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if !permissions_enforced(&locked) {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        eprintln!("skipping test_unreadable_file_is_counted_but_not_grouped: permissions not enforced");
        return;
    }

    let roots: RootSet = [dir.path()].into_iter().collect();
    let handle = begin_scan(&roots).unwrap();
    let mut session = ScanSession::new();
    let outcome = handle.drain_into(&mut session).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    let report = session.current_groups();
    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.hash_failures, 1);
    assert_eq!(report.total_files_scanned, 3);
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert!(matches!(
        session.failures()[0],
        HashError::PermissionDenied(_)
    ));
}

#[test]
fn test_unreadable_directory_does_not_abort_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("visible.txt"), "x").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inside.txt"), "x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipping test_unreadable_directory_does_not_abort_scan: permissions not enforced");
        return;
    }

    let roots: RootSet = [dir.path()].into_iter().collect();
    let handle = begin_scan(&roots).unwrap();
    let mut session = ScanSession::new();
    let outcome = handle.drain_into(&mut session).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!outcome.cancelled);
    assert_eq!(session.current_groups().total_files_scanned, 1);
    assert_eq!(outcome.walk_skips.len(), 1);
    assert_eq!(session.walk_skips().len(), 1);
    assert!(matches!(
        &outcome.walk_skips[0],
        ScanError::PermissionDenied(path) if path.ends_with("locked")
    ));
}
