use dupescan::actions::{
    delete_files, move_files, ActionError, CollisionPolicy, DeleteConfig, MoveConfig,
};
use dupescan::engine::begin_scan;
use dupescan::scanner::RootSet;
use dupescan::session::ScanSession;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn hello_world(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let a = dir.join("a.txt");
    let b = dir.join("b.txt");
    let c = dir.join("c.txt");
    fs::write(&a, "hello").unwrap();
    fs::write(&b, "hello").unwrap();
    fs::write(&c, "world").unwrap();
    (a, b, c)
}

#[test]
fn test_delete_one_member_of_group() {
    let dir = tempdir().unwrap();
    let (a, b, c) = hello_world(dir.path());

    let report = delete_files(&[a.clone()], &DeleteConfig::default());

    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert!(!a.exists());
    assert_eq!(fs::read_to_string(&b).unwrap(), "hello");
    assert_eq!(fs::read_to_string(&c).unwrap(), "world");
}

#[test]
fn test_delete_then_rescan_has_no_duplicates() {
    let dir = tempdir().unwrap();
    let (a, _, _) = hello_world(dir.path());
    let _ = delete_files(&[a], &DeleteConfig::default());

    let roots: RootSet = [dir.path()].into_iter().collect();
    let handle = begin_scan(&roots).unwrap();
    let mut session = ScanSession::new();
    handle.drain_into(&mut session);

    let report = session.current_groups();
    assert!(report.groups.is_empty());
    assert_eq!(report.total_files_scanned, 2);
}

#[test]
fn test_delete_batch_is_independent_per_path() {
    let dir = tempdir().unwrap();
    let (a, b, _) = hello_world(dir.path());
    let ghost = dir.path().join("ghost.txt");

    let report = delete_files(&[a.clone(), ghost.clone(), b.clone()], &DeleteConfig::default());

    assert_eq!(report.succeeded, vec![a, b]);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failures[0].path, ghost);
}

#[test]
fn test_move_collision_default_skips() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let target = dir.path().join("target");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&target).unwrap();
    let (_, b, _) = hello_world(&src);
    fs::write(target.join("b.txt"), "different").unwrap();

    let report = move_files(&[b.clone()], &target, &MoveConfig::default());

    assert_eq!(report.succeeded_count(), 0);
    assert!(matches!(
        report.failures[0].error,
        ActionError::DestinationExists(_)
    ));
    assert_eq!(fs::read_to_string(&b).unwrap(), "hello");
    assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "different");
}

#[test]
fn test_move_collision_overwrite_replaces() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let target = dir.path().join("target");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&target).unwrap();
    let (_, b, _) = hello_world(&src);
    fs::write(target.join("b.txt"), "different").unwrap();

    let config = MoveConfig::default().with_collision_policy(CollisionPolicy::Overwrite);
    let report = move_files(&[b.clone()], &target, &config);

    assert_eq!(report.succeeded_count(), 1);
    assert!(!b.exists());
    assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "hello");
}

#[test]
fn test_move_collision_rename_keeps_both() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let target = dir.path().join("target");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&target).unwrap();
    let (_, b, _) = hello_world(&src);
    fs::write(target.join("b.txt"), "different").unwrap();

    let config = MoveConfig::default().with_collision_policy(CollisionPolicy::Rename);
    let report = move_files(&[b], &target, &config);

    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "different");
    assert_eq!(fs::read_to_string(target.join("b (1).txt")).unwrap(), "hello");
}

#[test]
fn test_move_same_name_from_two_dirs() {
    let dir = tempdir().unwrap();
    let one = dir.path().join("one");
    let two = dir.path().join("two");
    let target = dir.path().join("target");
    for d in [&one, &two, &target] {
        fs::create_dir(d).unwrap();
    }
    fs::write(one.join("song.mp3"), "x").unwrap();
    fs::write(two.join("song.mp3"), "x").unwrap();

    let report = move_files(
        &[one.join("song.mp3"), two.join("song.mp3")],
        &target,
        &MoveConfig::default(),
    );

    // Second move collides with the first
    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert!(two.join("song.mp3").exists());
}

#[test]
fn test_move_to_file_destination_fails_every_path() {
    let dir = tempdir().unwrap();
    let (a, b, c) = hello_world(dir.path());

    let report = move_files(&[a.clone(), b.clone()], &c, &MoveConfig::default());

    assert_eq!(report.failed_count(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.error, ActionError::DestinationMissing(_))));
    assert!(a.exists() && b.exists());
}
