//! End-to-end crawl tests over temp trees of text files: session claims,
//! resume idempotence, dedup suppression, discovery filtering, worker-count
//! equivalence, and scratch cleanup.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use sharecrawl::engine::crawl::{CrawlOpts, run_crawl};
use sharecrawl::engine::tools::DiscoveryFilter;
use sharecrawl::mapper::CrawlTarget;
use sharecrawl::scratch::ScratchManager;
use sharecrawl::store::{DedupStore, SessionStore};
use sharecrawl::types::{CrawlCounts, SessionBackend};
use sharecrawl::utils::AppConfig;
use sharecrawl::writer::IndexWriter;

struct Harness {
    _state_dir: tempfile::TempDir,
    session_path: PathBuf,
    dedupe_path: PathBuf,
    out_path: PathBuf,
    scratch_root: PathBuf,
    cfg: AppConfig,
}

impl Harness {
    fn new() -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.temp_dir = state_dir.path().join("tmp");
        fs::create_dir_all(&cfg.temp_dir).unwrap();
        Self {
            session_path: state_dir.path().join("session.db"),
            dedupe_path: state_dir.path().join("dedupe.db"),
            out_path: state_dir.path().join("out.csv"),
            scratch_root: cfg.temp_dir.clone(),
            _state_dir: state_dir,
            cfg,
        }
    }

    fn run(&self, root: &Path, workers: usize, dedupe: bool) -> CrawlCounts {
        let target = CrawlTarget::new(root);
        let session = SessionStore::open(&self.session_path, SessionBackend::Sqlite).unwrap();
        let dedupe_store = dedupe.then(|| DedupStore::open(&self.dedupe_path).unwrap());
        let writer = IndexWriter::open(&self.out_path, self.cfg.csv_buffer_bytes).unwrap();
        let scratch = ScratchManager::new(&self.cfg.temp_dir).unwrap();
        let cancel = Arc::new(AtomicBool::new(false));
        let opts = CrawlOpts {
            workers: Some(workers),
            verbose: false,
            filter: DiscoveryFilter::default(),
        };
        run_crawl(
            &target,
            &self.cfg,
            &opts,
            &session,
            dedupe_store.as_ref(),
            &writer,
            &scratch,
            &cancel,
        )
        .unwrap()
    }

    fn session_count(&self) -> usize {
        SessionStore::open(&self.session_path, SessionBackend::Sqlite)
            .unwrap()
            .count()
            .unwrap()
    }

    fn csv_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.out_path)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}

fn create_text_tree(root: &Path) {
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join("notes/old")).unwrap();
    fs::write(root.join("docs/plan.txt"), "the migration plan").unwrap();
    fs::write(root.join("docs/creds.txt"), "user=admin pass=hunter2").unwrap();
    fs::write(root.join("notes/todo.txt"), "rotate the keys").unwrap();
    fs::write(root.join("notes/old/archive.txt"), "stale notes").unwrap();
}

#[test]
fn test_crawl_emits_one_record_per_file() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    create_text_tree(&root);

    let h = Harness::new();
    let counts = h.run(&root, 2, false);

    assert_eq!(counts.files_total, 4);
    assert_eq!(counts.files_processed, 4);
    assert_eq!(counts.files_skipped, 0);
    assert_eq!(h.csv_lines().len(), 4);
    // Invariant: exactly one session entry per reachable file.
    assert_eq!(h.session_count(), 4);
}

#[test]
fn test_csv_escaping_of_adversarial_text_content() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("notes.txt"), "hello,world\n\"quote\"").unwrap();

    let h = Harness::new();
    h.run(&root, 1, false);

    let lines = h.csv_lines();
    assert_eq!(lines.len(), 1);
    // Commas and newlines become spaces, quotes are doubled by the encoder.
    assert!(
        lines[0].ends_with("\"hello world \"\"quote\"\"\""),
        "unexpected line: {}",
        lines[0]
    );
    assert!(lines[0].contains("\"txt\""));
    assert!(lines[0].contains("\"text\""));
}

#[test]
fn test_second_run_with_same_session_emits_nothing() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    create_text_tree(&root);

    let h = Harness::new();
    let first = h.run(&root, 2, false);
    assert_eq!(first.files_processed, 4);

    let second = h.run(&root, 2, false);
    assert_eq!(second.files_processed, 0);
    assert_eq!(second.files_skipped, 4);
    assert_eq!(h.csv_lines().len(), 4);
    assert_eq!(h.session_count(), 4);
}

#[test]
fn test_resume_visits_every_file_exactly_once() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    create_text_tree(&root);

    // Run A processes a subset (simulated by pre-claiming half the files).
    let h = Harness::new();
    {
        let session = SessionStore::open(&h.session_path, SessionBackend::Sqlite).unwrap();
        assert!(session
            .claim(&root.join("docs/plan.txt").to_string_lossy())
            .unwrap());
        assert!(session
            .claim(&root.join("notes/todo.txt").to_string_lossy())
            .unwrap());
    }

    let counts = h.run(&root, 2, false);
    assert_eq!(counts.files_processed, 2);
    assert_eq!(counts.files_skipped, 2);
    assert_eq!(h.session_count(), 4);
}

#[test]
fn test_dedup_suppresses_identical_content() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.txt"), "same bytes").unwrap();
    fs::write(root.join("b.txt"), "same bytes").unwrap();

    let h = Harness::new();
    let counts = h.run(&root, 1, true);

    assert_eq!(counts.files_processed, 1);
    assert_eq!(counts.files_skipped, 1);
    assert_eq!(h.csv_lines().len(), 1);
    // Both paths are marked done even though only one record was emitted.
    assert_eq!(h.session_count(), 2);
}

#[test]
fn test_dedup_holds_across_runs_of_different_roots() {
    let tree = tempfile::tempdir().unwrap();
    let root_a = tree.path().join("a");
    let root_b = tree.path().join("b");
    fs::create_dir_all(&root_a).unwrap();
    fs::create_dir_all(&root_b).unwrap();
    fs::write(root_a.join("doc.txt"), "shared secret").unwrap();
    fs::write(root_b.join("copy.txt"), "shared secret").unwrap();

    let h = Harness::new();
    let first = h.run(&root_a, 1, true);
    let second = h.run(&root_b, 1, true);

    assert_eq!(first.files_processed, 1);
    assert_eq!(second.files_processed, 0);
    assert_eq!(second.files_skipped, 1);
    assert_eq!(h.csv_lines().len(), 1);
}

#[test]
fn test_discovery_filter_bounds_apply() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    fs::create_dir_all(root.join("node_modules")).unwrap();
    fs::write(root.join("small.txt"), "ok").unwrap();
    fs::write(root.join("big.txt"), "x".repeat(10_000)).unwrap();
    fs::write(root.join("node_modules/dep.txt"), "ignored").unwrap();

    let h = Harness::new();
    let target = CrawlTarget::new(&root);
    let session = SessionStore::open(&h.session_path, SessionBackend::Sqlite).unwrap();
    let writer = IndexWriter::open(&h.out_path, h.cfg.csv_buffer_bytes).unwrap();
    let scratch = ScratchManager::new(&h.cfg.temp_dir).unwrap();
    let cancel = Arc::new(AtomicBool::new(false));
    let opts = CrawlOpts {
        workers: Some(1),
        verbose: false,
        filter: DiscoveryFilter {
            max_size: Some(1000),
            exclude_dirs: vec!["node_modules".to_string()],
            name_pattern: Some("*.txt".to_string()),
            ..Default::default()
        },
    };
    let counts = run_crawl(
        &target, &h.cfg, &opts, &session, None, &writer, &scratch, &cancel,
    )
    .unwrap();

    assert_eq!(counts.files_total, 1);
    assert_eq!(counts.files_processed, 1);
    let lines = h.csv_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("small.txt"));
}

#[test]
fn test_worker_counts_produce_equivalent_output() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    fs::create_dir_all(&root).unwrap();
    for i in 0..20 {
        fs::write(root.join(format!("f{i:02}.txt")), format!("content {i}")).unwrap();
    }

    let serial = Harness::new();
    serial.run(&root, 1, false);
    let parallel = Harness::new();
    parallel.run(&root, 4, false);

    // Timestamps differ; everything after the first comma is deterministic.
    let strip_ts = |line: &String| line.split_once(',').map(|(_, rest)| rest.to_string());
    let mut a: Vec<_> = serial.csv_lines().iter().filter_map(strip_ts).collect();
    let mut b: Vec<_> = parallel.csv_lines().iter().filter_map(strip_ts).collect();
    a.sort();
    b.sort();
    assert_eq!(a.len(), 20);
    assert_eq!(a, b);
}

#[test]
fn test_no_scratch_dirs_survive_the_run() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    create_text_tree(&root);

    let h = Harness::new();
    h.run(&root, 2, false);

    let leftovers: Vec<_> = fs::read_dir(&h.scratch_root)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(
        leftovers.is_empty(),
        "scratch root not empty: {leftovers:?}"
    );
}

#[test]
fn test_unreadable_subtree_does_not_abort_discovery() {
    let tree = tempfile::tempdir().unwrap();
    let root = tree.path().join("data");
    fs::create_dir_all(root.join("locked")).unwrap();
    fs::write(root.join("open.txt"), "visible").unwrap();
    fs::write(root.join("locked/hidden.txt"), "invisible").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();
    }

    let h = Harness::new();
    let counts = h.run(&root, 1, false);

    #[cfg(unix)]
    fs::set_permissions(
        root.join("locked"),
        fs::Permissions::from_mode(0o755),
    )
    .unwrap();

    assert!(counts.files_processed >= 1);
    assert!(h.csv_lines().iter().any(|l| l.contains("open.txt")));
}
