use dupescan::duplicates::GroupReport;
use dupescan::engine::begin_scan;
use dupescan::scanner::RootSet;
use dupescan::session::ScanSession;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn scan(roots: &RootSet) -> GroupReport {
    let handle = begin_scan(roots).unwrap();
    let mut session = ScanSession::new();
    handle.drain_into(&mut session).unwrap();
    session.current_groups()
}

fn roots(paths: &[&Path]) -> RootSet {
    paths.iter().copied().collect()
}

#[test]
fn test_duplicates_across_roots() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    let backup = dir.path().join("backup");
    fs::create_dir(&music).unwrap();
    fs::create_dir(&backup).unwrap();
    fs::write(music.join("track.flac"), "audio").unwrap();
    fs::write(backup.join("track-copy.flac"), "audio").unwrap();
    fs::write(backup.join("other.flac"), "other").unwrap();

    let report = scan(&roots(&[&music, &backup]));

    assert_eq!(report.total_files_scanned, 3);
    assert_eq!(report.groups.len(), 1);
    let names: Vec<_> = report.groups[0]
        .paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    // Roots are walked in selection order
    assert_eq!(names, vec!["track.flac", "track-copy.flac"]);
}

#[test]
fn test_nested_root_files_counted_once() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(dir.path().join("outer.txt"), "one").unwrap();
    fs::write(inner.join("inner.txt"), "two").unwrap();

    let report = scan(&roots(&[&inner, dir.path()]));

    assert_eq!(report.total_files_scanned, 2);
    assert!(report.groups.is_empty());
}

#[test]
fn test_same_root_different_spelling() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("f.txt"), "x").unwrap();
    let dotted = dir.path().join("sub").join(".").join("..").join("sub");

    let mut set = RootSet::new();
    assert!(set.add(&sub));
    assert!(set.add(&dotted));

    let report = scan(&set);

    // A file must never be grouped with itself
    assert_eq!(report.total_files_scanned, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_root_set_edits_after_scan_start() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("f.txt"), "x").unwrap();

    let mut set = roots(&[dir.path()]);
    let handle = begin_scan(&set).unwrap();
    set.remove(0);
    assert!(set.is_empty());

    let mut session = ScanSession::new();
    handle.drain_into(&mut session).unwrap();
    assert_eq!(session.current_groups().total_files_scanned, 1);
}
