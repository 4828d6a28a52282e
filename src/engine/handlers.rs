//! Command handlers: layer CLI flags onto the loaded configuration, wire up
//! the run's dependencies, and dispatch.

use anyhow::{Context, Result};

use crate::bridge;
use crate::engine::arg_parser::{Cli, Commands, CrawlArgs, SearchIndexCommands};
use crate::engine::crawl::CrawlOpts;
use crate::engine::tools::{
    DiscoveryFilter, dedupe_db_path, output_csv_path, session_db_path, setup_ctrlc_handler,
};
use crate::mapper::CrawlTarget;
use crate::scratch::ScratchManager;
use crate::store::{DedupStore, SessionStore};
use crate::types::{CrawlCounts, SessionBackend};
use crate::utils::{AppConfig, Colors, load_config, setup_logging};
use crate::writer::IndexWriter;

pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Crawl(args) => handle_crawl(args),
        Commands::SearchIndex(cmd) => handle_search_index(cmd),
    }
}

/// Apply CLI overrides on top of the layered config (last layer wins).
fn apply_crawl_args(cfg: &mut AppConfig, args: &CrawlArgs) -> Result<()> {
    if let Some(v) = args.dedupe {
        cfg.dedupe_enabled = v;
    }
    if let Some(ref v) = args.dedupe_hash {
        cfg.dedupe_hash = v.parse()?;
    }
    if let Some(v) = args.timeout {
        cfg.command_timeout_seconds = v;
    }
    if let Some(v) = args.depth {
        cfg.max_recursion_depth = v;
    }
    if let Some(ref v) = args.temp_dir {
        cfg.temp_dir = v.clone();
    }
    cfg.exclude_dirs.extend(args.exclude_dirs.iter().cloned());
    Ok(())
}

fn handle_crawl(args: &CrawlArgs) -> Result<()> {
    let mut cfg = load_config()?;
    apply_crawl_args(&mut cfg, args)?;
    let verbose = args.verbose.unwrap_or(false);
    setup_logging(&cfg.log_level, verbose, cfg.log_file.as_deref());

    if !args.root.is_dir() {
        anyhow::bail!("root {} is not a directory", args.root.display());
    }

    let opts = CrawlOpts {
        workers: args.workers,
        verbose,
        filter: DiscoveryFilter {
            min_size: args.min_size,
            max_size: args.max_size,
            exclude_dirs: cfg.exclude_dirs.clone(),
            name_pattern: args.name_pattern.clone(),
            mtime_within_days: args.mtime_days,
        },
    };

    let target = CrawlTarget::new(&args.root);
    let requested_workers = args.workers.unwrap_or(cfg.default_thread_count);
    if cfg.session_backend == SessionBackend::AppendText && requested_workers > 1 {
        anyhow::bail!("append-text session backend requires --workers 1");
    }
    let session = SessionStore::open(&session_db_path(&args.root), cfg.session_backend)
        .context("open session store")?;
    let dedupe = if cfg.dedupe_enabled {
        Some(DedupStore::open(&dedupe_db_path(&args.root)).context("open dedup store")?)
    } else {
        None
    };
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| output_csv_path(&args.root));
    let writer = IndexWriter::open(&out_path, cfg.csv_buffer_bytes)?;
    let scratch = ScratchManager::new(&cfg.temp_dir)?;
    let cancel = setup_ctrlc_handler()?;

    let counts = crate::engine::crawl::run_crawl(
        &target,
        &cfg,
        &opts,
        &session,
        dedupe.as_ref(),
        &writer,
        &scratch,
        &cancel,
    );
    // Scratch must not survive any exit path, the error one included.
    scratch.cleanup_all();
    let counts = counts?;

    print_summary(&counts, &out_path.display().to_string());
    Ok(())
}

fn print_summary(counts: &CrawlCounts, output: &str) {
    log::info!(
        "{} | {} | {} -> {}",
        Colors::colorize(
            Colors::PROCESSED,
            &format!("Processed: {}", counts.files_processed)
        ),
        Colors::colorize(
            Colors::SKIPPED,
            &format!("Skipped: {}", counts.files_skipped)
        ),
        Colors::colorize(Colors::ERROR, &format!("Errors: {}", counts.files_error)),
        output
    );
    if counts.nested_dropped > 0 {
        log::warn!(
            "{} nested files dropped at depth or fan-out bounds",
            counts.nested_dropped
        );
    }
}

fn handle_search_index(cmd: &SearchIndexCommands) -> Result<()> {
    let cfg = load_config()?;
    setup_logging(&cfg.log_level, false, cfg.log_file.as_deref());
    bridge::handle_command(cmd)
}
