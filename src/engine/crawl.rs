//! The crawl engine: streaming discovery feeding a worker pool, exactly-once
//! claiming through the session store, per-class extraction deadlines, and
//! depth-bounded nested expansion.
//!
//! Depth and parent identity are explicit arguments threaded down the
//! per-file pipeline; nothing about a file's position in the tree lives in
//! ambient state.

use anyhow::Result;
use crossbeam_channel::bounded;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use walkdir::WalkDir;

use crate::engine::classify::classify;
use crate::engine::hashing::hash_file;
use crate::engine::progress::{
    self, ProgressBar, create_counter, flush_progress_remainder, report_progress_batched,
    set_bar_total,
};
use crate::engine::registry::{self, Expansion, TimeoutClass};
use crate::engine::stats::CrawlStats;
use crate::engine::tools::{DiscoveryFilter, now_unix_secs};
use crate::extract::{self, ExtractCtx};
use crate::mapper::{CrawlTarget, extension_of};
use crate::scratch::ScratchManager;
use crate::store::{DedupStore, SessionStore};
use crate::types::{CrawlCounts, DocClass, FileRecord};
use crate::utils::AppConfig;
use crate::utils::config::{PATH_CHANNEL_CAP, PROGRESS_UPDATE_BATCH_SIZE};
use crate::writer::IndexWriter;

/// Per-run options on top of the layered configuration.
#[derive(Clone, Debug, Default)]
pub struct CrawlOpts {
    /// Worker count override; falls back to the configured default, capped
    /// by the FD limit.
    pub workers: Option<usize>,
    /// Show the progress bar.
    pub verbose: bool,
    /// Discovery predicate.
    pub filter: DiscoveryFilter,
}

/// Shared engine state for one run. Stores, writer, and stats are explicit
/// dependencies; workers borrow this, nothing is global.
pub struct CrawlShared<'a> {
    pub target: &'a CrawlTarget,
    pub cfg: &'a AppConfig,
    pub session: &'a SessionStore,
    pub dedupe: Option<&'a DedupStore>,
    pub writer: &'a IndexWriter,
    pub scratch: &'a ScratchManager,
    pub stats: &'a CrawlStats,
    pub cancel: &'a Arc<AtomicBool>,
    /// First fatal error (index writer failure); set once, stops the run.
    fatal: Mutex<Option<String>>,
    bar: Option<ProgressBar>,
    bar_counter: AtomicUsize,
}

impl<'a> CrawlShared<'a> {
    fn record_fatal(&self, msg: String) {
        log::error!("{msg}");
        let _ = self.fatal.lock().unwrap().get_or_insert(msg);
        self.cancel.store(true, Ordering::Relaxed);
    }

    fn deadline_for(&self, timeout: TimeoutClass) -> Duration {
        let secs = match timeout {
            TimeoutClass::Default => self.cfg.command_timeout_seconds,
            TimeoutClass::Image => self.cfg.image_timeout_seconds,
            TimeoutClass::Audio => self.cfg.audio_timeout_seconds,
        };
        Duration::from_secs(secs)
    }
}

/// Run a crawl to completion (or cooperative shutdown). Per-file errors are
/// counted, never fatal; the only fatal condition after startup is an
/// unappendable output file.
pub fn run_crawl(
    target: &CrawlTarget,
    cfg: &AppConfig,
    opts: &CrawlOpts,
    session: &SessionStore,
    dedupe: Option<&DedupStore>,
    writer: &IndexWriter,
    scratch: &ScratchManager,
    cancel: &Arc<AtomicBool>,
) -> Result<CrawlCounts> {
    let stats = CrawlStats::new();
    let workers = effective_workers(cfg, opts);
    log::debug!(
        "Crawling {} with {} workers",
        target.root().display(),
        workers
    );

    let shared = CrawlShared {
        target,
        cfg,
        session,
        dedupe,
        writer,
        scratch,
        stats: &stats,
        cancel,
        fatal: Mutex::new(None),
        bar: opts.verbose.then(|| create_counter("Crawling")),
        bar_counter: AtomicUsize::new(0),
    };

    let (path_tx, path_rx) = bounded::<PathBuf>(PATH_CHANNEL_CAP);

    std::thread::scope(|scope| {
        let walk_shared = &shared;
        let filter = &opts.filter;
        scope.spawn(move || {
            let total = walk_and_send(walk_shared, filter, path_tx);
            walk_shared.stats.add_total(total);
            if let Some(bar) = &walk_shared.bar {
                set_bar_total(bar, total);
            }
        });

        for _ in 0..workers {
            let worker_rx = path_rx.clone();
            let worker_shared = &shared;
            scope.spawn(move || {
                while let Ok(path) = worker_rx.recv() {
                    if worker_shared.cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    process_root_file(worker_shared, &path);
                    report_progress_batched(
                        worker_shared.bar.as_ref(),
                        &worker_shared.bar_counter,
                        PROGRESS_UPDATE_BATCH_SIZE,
                    );
                }
            });
        }
        drop(path_rx);
    });

    flush_progress_remainder(
        shared.bar.as_ref(),
        shared.bar_counter.load(Ordering::Relaxed),
        PROGRESS_UPDATE_BATCH_SIZE,
    );
    if let Some(bar) = &shared.bar {
        progress::clear_bar(bar);
    }

    // Final flush is part of the contract, shutdown included.
    let flush_result = writer.flush();
    scratch.cleanup_all();
    flush_result?;

    if let Some(msg) = shared.fatal.lock().unwrap().take() {
        anyhow::bail!("{msg}");
    }
    if cancel.load(Ordering::Relaxed) {
        log::warn!("Crawl interrupted; session store keeps completed claims");
    }
    Ok(stats.counts())
}

/// Descriptors one worker can hold at peak: the source file plus its hash
/// reader, the child's stdout/stderr pipes, the scratch-dir enumeration,
/// and its turn on the store and writer locks.
const WORKER_FD_ESTIMATE: u64 = 12;

/// Descriptors the process keeps open regardless of worker count: session
/// and dedup databases with their WAL/SHM files, the output CSV, the log
/// sink, stdio.
const PROCESS_FD_RESERVED: u64 = 32;

fn effective_workers(cfg: &AppConfig, opts: &CrawlOpts) -> usize {
    let requested = opts.workers.unwrap_or(cfg.default_thread_count).max(1);
    let capped = fd_limited_workers(requested);
    if capped < requested {
        log::debug!("Capping workers {requested} -> {capped} (RLIMIT_NOFILE)");
    }
    capped
}

/// Cap concurrency so peak descriptor usage stays under the soft
/// RLIMIT_NOFILE, after setting aside the process-wide files.
#[cfg(unix)]
fn fd_limited_workers(requested: usize) -> usize {
    let mut rlim = std::mem::MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return requested;
    }
    let soft = unsafe { rlim.assume_init() }.rlim_cur;
    if soft == libc::RLIM_INFINITY || soft > i64::MAX as u64 {
        return requested;
    }
    let usable = soft.saturating_sub(PROCESS_FD_RESERVED);
    let cap = (usable / WORKER_FD_ESTIMATE).max(1) as usize;
    cap.min(requested)
}

#[cfg(not(unix))]
fn fd_limited_workers(requested: usize) -> usize {
    requested
}

/// Discovery: stream regular files passing the predicate into the worker
/// channel. Unreadable subtrees are logged and skipped. Returns the number
/// of files sent (the run's total for progress and stats).
fn walk_and_send(
    shared: &CrawlShared,
    filter: &DiscoveryFilter,
    path_tx: crossbeam_channel::Sender<PathBuf>,
) -> usize {
    let mut count = 0_usize;
    for entry in WalkDir::new(shared.target.root()) {
        if shared.cancel.load(Ordering::Relaxed) {
            break;
        }
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let meta = match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => {
                        log::warn!("cannot stat {}: {e}", entry.path().display());
                        continue;
                    }
                };
                if !filter.matches(entry.path(), &meta) {
                    continue;
                }
                if path_tx.send(entry.into_path()).is_err() {
                    break;
                }
                count += 1;
            }
            Err(err) => {
                log::warn!("discovery error: {err}");
            }
        }
    }
    count
}

/// Top of the per-file pipeline: claim, dedup, then the recursive document
/// pipeline at depth 0.
fn process_root_file(shared: &CrawlShared, path: &Path) {
    let path_str = path.to_string_lossy();
    match shared.session.claim(&path_str) {
        Ok(true) => {}
        Ok(false) => {
            shared.stats.inc_skipped();
            return;
        }
        Err(e) => {
            // Store I/O failure, not a duplicate: report and do not retry
            // this run.
            log::warn!("claim failed for {}: {e:#}", path.display());
            shared.stats.inc_error();
            return;
        }
    }

    let url = shared.target.logical_url(path);
    process_document(shared, path, path, &url, 0);
}

/// Process one document (top-level or nested): dedup, classify, extract
/// under deadline, expand nested payloads, then emit the record. The
/// record is emitted only after every nested expansion has returned.
fn process_document(
    shared: &CrawlShared,
    read_path: &Path,
    record_path: &Path,
    url: &str,
    depth: usize,
) {
    if !dedup_passes(shared, read_path) {
        shared.stats.inc_skipped();
        return;
    }

    let class = classify(read_path, shared.cancel);
    let entry = registry::entry_for_class(class);
    let timeout = entry.map(|e| e.timeout).unwrap_or(TimeoutClass::Default);
    let expansion = entry.map(|e| e.expansion).unwrap_or(Expansion::Never);

    let ctx = ExtractCtx {
        cfg: shared.cfg,
        scratch: shared.scratch,
        cancel: shared.cancel,
        deadline: shared.deadline_for(timeout),
    };

    let (content, scratch) = match extract::extract(class, read_path, &ctx) {
        Ok(extraction) => (extraction.text, extraction.scratch),
        Err(e) => {
            // Timeout or tool failure: empty content, record still emitted,
            // and no nested expansion from a failed extraction.
            log::warn!("extraction failed for {}: {e:#}", read_path.display());
            shared.stats.inc_error();
            (String::new(), None)
        }
    };

    if let Some(scratch) = scratch {
        let nested = scratch.regular_files();
        if !nested.is_empty() {
            expand_nested(shared, &nested, record_path, url, depth, expansion);
        }
        // Scratch is released before this worker touches the next file.
        drop(scratch);
    }

    emit_record(shared, read_path, record_path, url, class, content);
}

/// Dedup gate: true means "emit this file". Hash failures fail open so a
/// locked file still produces a record.
fn dedup_passes(shared: &CrawlShared, read_path: &Path) -> bool {
    let Some(dedupe) = shared.dedupe else {
        return true;
    };
    match hash_file(read_path, shared.cfg.dedupe_hash) {
        Ok(hash) => match dedupe.claim(&hash, &read_path.to_string_lossy()) {
            Ok(first_sighting) => first_sighting,
            Err(e) => {
                log::warn!("dedup store error for {}: {e:#}", read_path.display());
                true
            }
        },
        Err(e) => {
            log::debug!("could not hash {}: {e}", read_path.display());
            true
        }
    }
}

/// Nested expansion with the depth and fan-out bounds. Dropped files are
/// counted, never silently lost in the stats.
fn expand_nested(
    shared: &CrawlShared,
    nested: &[PathBuf],
    parent_record_path: &Path,
    parent_url: &str,
    depth: usize,
    expansion: Expansion,
) {
    if depth >= shared.cfg.max_recursion_depth {
        for _ in nested {
            shared.stats.inc_nested_dropped();
        }
        log::warn!(
            "depth limit {} reached under {}; {} nested files dropped",
            shared.cfg.max_recursion_depth,
            parent_url,
            nested.len()
        );
        return;
    }

    let cap = match expansion {
        Expansion::WhenSparse => shared.cfg.ocr_max_images,
        Expansion::Always | Expansion::Never => usize::MAX,
    };

    for (i, nested_path) in nested.iter().enumerate() {
        if shared.cancel.load(Ordering::Relaxed) {
            return;
        }
        if i >= cap {
            for _ in &nested[i..] {
                shared.stats.inc_nested_dropped();
            }
            log::warn!(
                "fan-out cap {cap} reached under {parent_url}; {} nested files dropped",
                nested.len() - i
            );
            return;
        }
        let name = nested_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let nested_url = shared.target.nested_url(parent_url, &name);
        process_document(shared, nested_path, parent_record_path, &nested_url, depth + 1);
    }
}

fn emit_record(
    shared: &CrawlShared,
    read_path: &Path,
    record_path: &Path,
    url: &str,
    class: DocClass,
    content: String,
) {
    let record = FileRecord {
        timestamp: now_unix_secs(),
        logical_url: url.to_string(),
        physical_path: record_path.to_path_buf(),
        server: shared.target.server().to_string(),
        share: shared.target.share().to_string(),
        extension: extension_of(read_path),
        class,
        content,
    };
    match shared.writer.append(&record) {
        Ok(()) => shared.stats.inc_processed(),
        Err(e) => shared.record_fatal(format!("index writer failed: {e:#}")),
    }
}
