//! Engine module: crawl orchestration and its supporting pieces.

pub mod arg_parser;
pub mod classify;
pub mod command;
pub mod crawl;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod registry;
pub mod stats;
pub mod tools;

pub use arg_parser::{Cli, Commands, SearchIndexCommands};
pub use classify::{classify, probe_is_text, probe_mime};
pub use command::{CommandOutput, ExternalCommand};
pub use crawl::{CrawlOpts, run_crawl};
pub use handlers::handle_run;
pub use hashing::{hash_file, md5_hex};
pub use registry::{Expansion, RegistryEntry, TimeoutClass, class_for_mime, entry_for_mime};
pub use stats::CrawlStats;
pub use tools::{
    DiscoveryFilter, dedupe_db_path, glob_match, output_csv_path, session_db_path,
    setup_ctrlc_handler,
};
