//! Search index bridge: transform completed crawl CSVs into full-text index
//! batches, plus the read-side operations the query façade is built on.
//! Read-only with respect to the CSV; safe to run on a partial file.

mod client;
mod ops;

use anyhow::Result;

use crate::engine::arg_parser::SearchIndexCommands;
pub use client::SearchClient;
pub use ops::{
    CsvRecord, cache, copy_index, create_index, delete_csv, drop_index, import_csv, index_info,
    list_indexes, query,
};

pub fn handle_command(cmd: &SearchIndexCommands) -> Result<()> {
    match cmd {
        SearchIndexCommands::Init(target) => {
            let client = SearchClient::connect(&target.address)?;
            create_index(&client, &target.index)
        }
        SearchIndexCommands::Import {
            target,
            csv,
            batch_size,
        } => {
            let client = SearchClient::connect(&target.address)?;
            import_csv(&client, &target.index, csv, *batch_size)
        }
        SearchIndexCommands::Delete {
            target,
            csv,
            batch_size,
        } => {
            let client = SearchClient::connect(&target.address)?;
            delete_csv(&client, &target.index, csv, *batch_size)
        }
        SearchIndexCommands::Query {
            target,
            query: q,
            count,
            offset,
        } => {
            let client = SearchClient::connect(&target.address)?;
            query(&client, &target.index, q, *count, *offset)
        }
        SearchIndexCommands::Cache { target, doc_id } => {
            let client = SearchClient::connect(&target.address)?;
            cache(&client, &target.index, doc_id)
        }
        SearchIndexCommands::Copy { target, new_index } => {
            let client = SearchClient::connect(&target.address)?;
            copy_index(&client, &target.index, new_index)
        }
        SearchIndexCommands::Drop(target) => {
            let client = SearchClient::connect(&target.address)?;
            drop_index(&client, &target.index)
        }
        SearchIndexCommands::List { address } => {
            let client = SearchClient::connect(address)?;
            list_indexes(&client)
        }
        SearchIndexCommands::Info(target) => {
            let client = SearchClient::connect(&target.address)?;
            index_info(&client, &target.index)
        }
    }
}
