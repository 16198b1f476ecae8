use dupescan::duplicates::GroupReport;
use dupescan::engine::{begin_scan, EngineConfig, ScanEngine, ScanEvent, ScanOutcome};
use dupescan::scanner::{RootSet, WalkerConfig};
use dupescan::session::{ScanSession, SessionState};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn scan_with(engine: &ScanEngine, roots: &[&Path]) -> (GroupReport, ScanOutcome) {
    let roots: RootSet = roots.iter().copied().collect();
    let handle = engine.begin_scan(&roots).unwrap();
    let mut session = ScanSession::new();
    let outcome = handle.drain_into(&mut session).unwrap();
    handle.join().unwrap();
    (session.current_groups(), outcome)
}

fn scan(roots: &[&Path]) -> (GroupReport, ScanOutcome) {
    scan_with(&ScanEngine::with_defaults(), roots)
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (report, outcome) = scan(&[dir.path()]);

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files_scanned, 0);
    assert_eq!(outcome.total, 0);
    assert!(!outcome.cancelled);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"content a");
    write_file(&dir.path().join("b.txt"), b"content b");
    write_file(&dir.path().join("c.txt"), b"content c");

    let (report, _) = scan(&[dir.path()]);

    assert!(report.groups.is_empty());
    assert_eq!(report.total_files_scanned, 3);
    assert_eq!(report.unique_files, 3);
    assert_eq!(report.total_reclaimable_files, 0);
}

#[test]
fn test_scan_hello_world_scenario() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write_file(&root.join("a.txt"), b"hello");
    write_file(&root.join("b.txt"), b"hello");
    write_file(&root.join("c.txt"), b"world");

    let (report, outcome) = scan(&[&root]);

    assert_eq!(outcome.processed, 3);
    assert_eq!(report.total_files_scanned, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.total_reclaimable_files, 1);

    let group = &report.groups[0];
    assert_eq!(group.id, 1);
    assert_eq!(group.paths, vec![root.join("a.txt"), root.join("b.txt")]);
    assert_eq!(group.size(), Some(5));
}

#[test]
fn test_scan_reclaimable_count_is_members_minus_one() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_file(&dir.path().join(format!("x{i}")), b"xxx");
    }
    for i in 0..3 {
        write_file(&dir.path().join(format!("y{i}")), b"yyy");
    }
    write_file(&dir.path().join("z"), b"zzz");

    let (report, _) = scan(&[dir.path()]);

    assert_eq!(report.groups.len(), 2);
    // (4 - 1) + (3 - 1)
    assert_eq!(report.total_reclaimable_files, 5);
    assert_eq!(report.duplicated_files(), 7);
    assert_eq!(report.unique_files, 1);
}

#[test]
fn test_scan_group_ids_follow_discovery_order() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    // Sorted walk order: a1, a2, b1, b2
    write_file(&root.join("a1"), b"second content");
    write_file(&root.join("a2"), b"first content");
    write_file(&root.join("b1"), b"first content");
    write_file(&root.join("b2"), b"second content");

    let (report, _) = scan(&[&root]);

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].id, 1);
    assert_eq!(report.groups[0].paths[0], root.join("a1"));
    assert_eq!(report.groups[1].id, 2);
    assert_eq!(report.groups[1].paths[0], root.join("a2"));
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("empty1"), b"");
    write_file(&dir.path().join("empty2"), b"");

    let (report, _) = scan(&[dir.path()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size(), Some(0));
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two").join("three");
    fs::create_dir_all(&deep).unwrap();
    write_file(&dir.path().join("top.bin"), b"same");
    write_file(&deep.join("bottom.bin"), b"same");

    let (report, _) = scan(&[dir.path()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_scan_large_file_spanning_many_chunks() {
    let dir = tempdir().unwrap();
    let mut content = vec![7u8; 4096 * 5 + 17];
    write_file(&dir.path().join("big1"), &content);
    write_file(&dir.path().join("big2"), &content);
    // Differs only in the last byte
    *content.last_mut().unwrap() = 8;
    write_file(&dir.path().join("big3"), &content);

    let (report, _) = scan(&[dir.path()]);

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.unique_files, 1);
}

#[test]
fn test_scan_with_filters() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("keep1.txt"), b"dup");
    write_file(&dir.path().join("keep2.txt"), b"dup");
    write_file(&dir.path().join("skip.tmp"), b"dup");
    write_file(&dir.path().join(".hidden"), b"dup");

    let config = EngineConfig::default()
        .with_walker_config(WalkerConfig::new(true, vec!["*.tmp".to_string()]));
    let (report, _) = scan_with(&ScanEngine::new(config), &[dir.path()]);

    assert_eq!(report.total_files_scanned, 2);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_scan_parallel_hashing() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write_file(&dir.path().join(format!("f{i:02}")), format!("{}", i % 5).as_bytes());
    }

    let engine = ScanEngine::new(EngineConfig::default().with_hash_threads(4));
    let (report, outcome) = scan_with(&engine, &[dir.path()]);

    assert_eq!(outcome.processed, 30);
    assert_eq!(report.groups.len(), 5);
    assert_eq!(report.total_reclaimable_files, 25);
}

#[test]
fn test_progress_reaches_total_with_last_result() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write_file(&dir.path().join(format!("f{i}")), b"data");
    }

    let roots: RootSet = [dir.path()].into_iter().collect();
    let handle = begin_scan(&roots).unwrap();
    let events: Vec<ScanEvent> = handle.events().collect();

    let last_file = events
        .iter()
        .rposition(|e| matches!(e, ScanEvent::File(_)))
        .unwrap();
    match &events[last_file + 1] {
        ScanEvent::Progress(p) => {
            assert_eq!(p.processed, 5);
            assert_eq!(p.total, 5);
        }
        other => panic!("Expected Progress after last File, got {:?}", other),
    }
    assert!(events[last_file + 2].is_completed());
    assert_eq!(events.len(), last_file + 3);
}

#[test]
fn test_session_state_through_scan() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"1");

    let roots: RootSet = [dir.path()].into_iter().collect();
    let handle = begin_scan(&roots).unwrap();
    let mut session = ScanSession::new();
    assert_eq!(session.state(), SessionState::Idle);

    handle.drain_into(&mut session);

    assert_eq!(session.state(), SessionState::Completed);
    assert!(session.progress().is_complete());
    assert!(session.walk_skips().is_empty());
}

#[test]
fn test_consecutive_scans_are_independent() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"same");
    write_file(&dir.path().join("b"), b"same");

    let (first, _) = scan(&[dir.path()]);
    fs::remove_file(dir.path().join("b")).unwrap();
    let (second, _) = scan(&[dir.path()]);

    assert_eq!(first.groups.len(), 1);
    assert!(second.groups.is_empty());
    assert_eq!(second.total_files_scanned, 1);
}

fn multi_group_tree(root: &Path) {
    let sub = root.join("sub");
    fs::create_dir(&sub).unwrap();
    write_file(&root.join("a1"), b"alpha");
    write_file(&sub.join("a2"), b"alpha");
    write_file(&root.join("b1"), b"beta");
    write_file(&sub.join("b2"), b"beta");
    write_file(&sub.join("b3"), b"beta");
    write_file(&root.join("solo"), b"gamma");
}

#[test]
fn test_rescanning_static_tree_gives_identical_groups() {
    let dir = tempdir().unwrap();
    multi_group_tree(dir.path());

    let (first, _) = scan(&[dir.path()]);
    let (second, _) = scan(&[dir.path()]);

    assert_eq!(first.groups.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_rescanning_with_parallel_hashing_gives_same_groups() {
    let dir = tempdir().unwrap();
    multi_group_tree(dir.path());
    let engine = ScanEngine::new(EngineConfig::default().with_hash_threads(4));

    // Arrival order is unspecified, so compare membership only
    let grouping = |report: &GroupReport| {
        let mut groups: Vec<Vec<_>> = report
            .groups
            .iter()
            .map(|g| {
                let mut paths = g.paths.clone();
                paths.sort();
                paths
            })
            .collect();
        groups.sort();
        groups
    };

    let (first, _) = scan_with(&engine, &[dir.path()]);
    let (second, _) = scan_with(&engine, &[dir.path()]);

    assert_eq!(grouping(&first), grouping(&second));
    assert_eq!(first.total_files_scanned, second.total_files_scanned);
    assert_eq!(first.total_reclaimable_files, 3);
    assert_eq!(second.total_reclaimable_files, 3);
}

#[test]
fn test_missing_root_is_a_walk_skip() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a"), b"x");
    let missing = dir.path().join("does-not-exist");

    let (report, outcome) = scan(&[dir.path(), &missing]);

    assert_eq!(report.total_files_scanned, 1);
    assert_eq!(outcome.walk_skips.len(), 1);
}
