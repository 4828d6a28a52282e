//! Sharecrawl CLI: crawl directory trees into CSV indexes and manage the
//! search index built from them.

use anyhow::Result;
use clap::Parser;
use sharecrawl::engine::arg_parser::Cli;
use sharecrawl::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
