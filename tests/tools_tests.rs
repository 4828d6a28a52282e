//! Discovery filter, glob, and output-naming tests.

use std::fs;
use std::path::Path;

use sharecrawl::engine::tools::{
    DiscoveryFilter, dedupe_db_path, glob_match, output_csv_path, output_stem, session_db_path,
};

#[test]
fn test_glob_star_and_question() {
    assert!(glob_match("*.txt", "notes.txt"));
    assert!(!glob_match("*.txt", "notes.pdf"));
    assert!(glob_match("Q?.docx", "Q1.docx"));
    assert!(!glob_match("Q?.docx", "Q10.docx"));
    assert!(glob_match("*pass*", "passwords.xlsx"));
    assert!(glob_match("*", "anything"));
}

#[test]
fn test_output_naming_flattens_separators() {
    assert_eq!(output_stem(Path::new("smb/fs01/share")), "smb_fs01_share");
    assert_eq!(output_stem(Path::new("local/data/")), "local_data");
    assert_eq!(
        output_csv_path(Path::new("smb/fs01/share")),
        Path::new("smb_fs01_share.csv")
    );
    assert_eq!(
        session_db_path(Path::new("smb/fs01/share")),
        Path::new(".smb_fs01_share.session.db")
    );
    assert_eq!(
        dedupe_db_path(Path::new("smb/fs01/share")),
        Path::new(".smb_fs01_share.dedupe.db")
    );
}

#[test]
fn test_filter_size_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.bin");
    let large = dir.path().join("large.bin");
    fs::write(&small, vec![0u8; 10]).unwrap();
    fs::write(&large, vec![0u8; 10_000]).unwrap();

    let filter = DiscoveryFilter {
        min_size: Some(100),
        max_size: Some(5_000),
        ..Default::default()
    };
    assert!(!filter.matches(&small, &fs::metadata(&small).unwrap()));
    assert!(!filter.matches(&large, &fs::metadata(&large).unwrap()));

    let mid = dir.path().join("mid.bin");
    fs::write(&mid, vec![0u8; 1_000]).unwrap();
    assert!(filter.matches(&mid, &fs::metadata(&mid).unwrap()));
}

#[test]
fn test_filter_path_substring_exclusion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Backup").join("old.txt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "x").unwrap();
    let meta = fs::metadata(&path).unwrap();

    let filter = DiscoveryFilter {
        exclude_dirs: vec!["Backup".to_string()],
        ..Default::default()
    };
    assert!(!filter.matches(&path, &meta));

    let empty = DiscoveryFilter::default();
    assert!(empty.matches(&path, &meta));
}

#[test]
fn test_filter_recent_mtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");
    fs::write(&path, "x").unwrap();
    let meta = fs::metadata(&path).unwrap();

    let filter = DiscoveryFilter {
        mtime_within_days: Some(1),
        ..Default::default()
    };
    // Just written: inside any recency window.
    assert!(filter.matches(&path, &meta));
}
