use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Filesystem document crawler for security auditing.
#[derive(Parser)]
#[command(name = "sharecrawl")]
#[command(about = "Crawl a mounted share, extract text from every file into a CSV index.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a directory tree and append one CSV record per file.
    Crawl(CrawlArgs),
    /// Manage the full-text search index built from completed CSVs.
    #[command(subcommand, name = "search-index")]
    SearchIndex(SearchIndexCommands),
}

#[derive(Clone, Parser)]
pub struct CrawlArgs {
    /// Root directory to crawl (e.g. smb/fs01/share for a mounted share).
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Worker thread count. Default from config (4).
    #[arg(long, short = 'n')]
    pub workers: Option<usize>,

    /// Minimum file size in bytes.
    #[arg(long)]
    pub min_size: Option<u64>,

    /// Maximum file size in bytes.
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Path substring exclusions, in addition to the configured ones.
    /// Can specify multiple: -e sub1 sub2
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude_dirs: Vec<String>,

    /// Filename glob pattern (* and ?).
    #[arg(long)]
    pub name_pattern: Option<String>,

    /// Only files modified within the last N days.
    #[arg(long)]
    pub mtime_days: Option<u64>,

    /// Enable content-hash dedup for this run.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub dedupe: Option<bool>,

    /// Dedup hash algorithm (md5/sha1/sha256).
    #[arg(long)]
    pub dedupe_hash: Option<String>,

    /// Default extractor timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Nested expansion depth bound.
    #[arg(long)]
    pub depth: Option<usize>,

    /// Scratch directory root.
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Output CSV path. Default: root name with separators flattened, .csv.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Verbose output with progress bar.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Parser)]
pub struct SearchIndexArgs {
    /// Search index address (host:port).
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Index name.
    #[arg(long, short = 'i')]
    pub index: String,
}

#[derive(Clone, Subcommand)]
pub enum SearchIndexCommands {
    /// Create the index with the document-search analyzers.
    Init(SearchIndexArgs),
    /// Bulk-import a crawl CSV.
    Import {
        #[command(flatten)]
        target: SearchIndexArgs,
        /// CSV file produced by a crawl.
        csv: PathBuf,
        /// Documents per bulk request.
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
    },
    /// Delete the documents listed in a crawl CSV.
    Delete {
        #[command(flatten)]
        target: SearchIndexArgs,
        csv: PathBuf,
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
    },
    /// Search the index and print ranked hits with highlights.
    Query {
        #[command(flatten)]
        target: SearchIndexArgs,
        query: String,
        /// Results count.
        #[arg(long, short = 'c', default_value_t = 10)]
        count: usize,
        /// Results offset.
        #[arg(long, short = 'o', default_value_t = 0)]
        offset: usize,
    },
    /// Print the cached text of one document.
    Cache {
        #[command(flatten)]
        target: SearchIndexArgs,
        doc_id: String,
    },
    /// Copy the index to a new name (server-side reindex).
    Copy {
        #[command(flatten)]
        target: SearchIndexArgs,
        /// Destination index name.
        new_index: String,
    },
    /// Delete the index.
    Drop(SearchIndexArgs),
    /// List indexes with document counts.
    List {
        /// Search index address (host:port).
        #[arg(value_name = "ADDRESS")]
        address: String,
    },
    /// Print index settings and mappings.
    Info(SearchIndexArgs),
}
