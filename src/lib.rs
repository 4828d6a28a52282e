//! Sharecrawl: filesystem document crawler for security auditing.
//!
//! Given a rooted directory (typically a mounted SMB/NFS share or a
//! mirrored site), discover every regular file, run the matching external
//! text extractor under a deadline, and append one CSV record per file. A
//! session store makes interrupted runs resumable; an optional dedup store
//! suppresses byte-identical duplicates; the search index bridge turns
//! completed CSVs into a full-text index.

pub mod bridge;
pub mod engine;
pub mod extract;
pub mod mapper;
pub mod scratch;
pub mod store;
pub mod types;
pub mod utils;
pub mod writer;

/// Re-export types for API
pub use types::*;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Result alias used by the public sharecrawl API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

use engine::crawl::CrawlOpts;
use engine::tools::{dedupe_db_path, output_csv_path, session_db_path};
use mapper::CrawlTarget;
use scratch::ScratchManager;
use store::{DedupStore, SessionStore};
use utils::AppConfig;
use writer::IndexWriter;

/// Single library entry point: crawl `root` with `cfg`/`opts`, writing the
/// CSV next to the working directory and the hidden session/dedup stores
/// beside it. Callers wanting finer control (their own stores, writer, or
/// cancellation flag) use [`engine::crawl::run_crawl`] directly.
pub fn crawl_dir(root: &Path, cfg: &AppConfig, opts: &CrawlOpts) -> Result<CrawlCounts> {
    let target = CrawlTarget::new(root);
    let session = SessionStore::open(&session_db_path(root), cfg.session_backend)?;
    let dedupe = if cfg.dedupe_enabled {
        Some(DedupStore::open(&dedupe_db_path(root))?)
    } else {
        None
    };
    let writer = IndexWriter::open(&output_csv_path(root), cfg.csv_buffer_bytes)?;
    let scratch = ScratchManager::new(&cfg.temp_dir)?;
    let cancel = Arc::new(AtomicBool::new(false));

    let counts = engine::crawl::run_crawl(
        &target,
        cfg,
        opts,
        &session,
        dedupe.as_ref(),
        &writer,
        &scratch,
        &cancel,
    );
    scratch.cleanup_all();
    counts
}
