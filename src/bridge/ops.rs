//! Search index operations: index creation with the document-search
//! analyzers, bulk CSV import/delete, query with highlights, document
//! cache display, and index management.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Value, json};
use std::path::Path;

use super::client::SearchClient;
use crate::engine::hashing::md5_hex;

/// One parsed CSV row in the fixed eight-field schema.
#[derive(Debug)]
pub struct CsvRecord {
    pub timestamp: i64,
    pub logical_url: String,
    pub physical_path: String,
    pub server: String,
    pub share: String,
    pub extension: String,
    pub class: String,
    pub content: String,
}

impl CsvRecord {
    fn from_row(row: &csv::StringRecord) -> Option<Self> {
        if row.len() < 8 {
            return None;
        }
        Some(Self {
            timestamp: row.get(0)?.parse().ok()?,
            logical_url: row.get(1)?.to_string(),
            physical_path: row.get(2)?.to_string(),
            server: row.get(3)?.to_string(),
            share: row.get(4)?.to_string(),
            extension: row.get(5)?.to_string(),
            class: row.get(6)?.to_string(),
            content: row.get(7)?.to_string(),
        })
    }

    /// Stable document id: hex MD5 of the logical URL, so re-imports upsert.
    pub fn doc_id(&self) -> String {
        md5_hex(&self.logical_url)
    }

    /// Map into the index document. Relevance weighting lives in the query
    /// (inurl ≫ intitle ≫ intext), not here.
    pub fn to_document(&self, site: &str) -> Value {
        let title = self
            .logical_url
            .rsplit(['/', '#'])
            .next()
            .unwrap_or_default();
        json!({
            "timestamp": self.timestamp,
            "inurl": self.logical_url,
            "relpath": self.physical_path,
            "server": self.server,
            "share": self.share,
            "site": site,
            "ext": self.extension,
            "intitle": title,
            "intext": self.content,
            "filetype": self.class,
        })
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Index settings: path-hierarchy analyzer for URLs, multilang stemming for
/// content, edge-ngram autocomplete, epoch-second timestamps.
fn index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "timestamp": {
                    "type": "date",
                    "format": "yyyy-MM-dd HH:mm:ss||epoch_second"
                },
                "inurl": {
                    "type": "text",
                    "analyzer": "path_analyzer",
                    "fields": {"keyword": {"type": "keyword"}}
                },
                "relpath": {"type": "keyword"},
                "server": {"type": "keyword"},
                "share": {"type": "keyword"},
                "site": {"type": "keyword"},
                "ext": {"type": "keyword"},
                "intitle": {"type": "text", "analyzer": "multilang"},
                "intext": {"type": "text", "analyzer": "multilang"},
                "filetype": {"type": "keyword"}
            }
        },
        "settings": {
            "index": {
                "number_of_shards": env_usize("OPENSEARCH_SHARDS", 1),
                "number_of_replicas": env_usize("OPENSEARCH_REPLICAS", 0),
                "refresh_interval": "30s"
            },
            "analysis": {
                "analyzer": {
                    "default": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "multilang_stop", "multilang_stemmer"]
                    },
                    "multilang": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "multilang_stop", "multilang_stemmer"]
                    },
                    "path_analyzer": {
                        "type": "custom",
                        "tokenizer": "path_tokenizer",
                        "filter": ["lowercase"]
                    },
                    "autocomplete": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "autocomplete_filter"]
                    }
                },
                "tokenizer": {
                    "path_tokenizer": {
                        "type": "path_hierarchy",
                        "delimiter": "/"
                    }
                },
                "filter": {
                    "multilang_stop": {
                        "type": "stop",
                        "stopwords": "_russian_"
                    },
                    "multilang_stemmer": {
                        "type": "stemmer",
                        "language": "russian"
                    },
                    "autocomplete_filter": {
                        "type": "edge_ngram",
                        "min_gram": 2,
                        "max_gram": 20
                    }
                }
            }
        }
    })
}

pub fn create_index(client: &SearchClient, index: &str) -> Result<()> {
    match client.put_json(&format!("/{index}"), &index_settings()) {
        Ok(_) => {
            log::info!("Index created: {index}");
            Ok(())
        }
        Err(e) if e.to_string().contains("resource_already_exists_exception") => {
            log::warn!("Index already exists: {index}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open CSV {}", path.display()))
}

fn bulk_errors(response: &Value) -> usize {
    response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| {
                    item.get("index")
                        .or_else(|| item.get("delete"))
                        .and_then(|op| op.get("error"))
                        .is_some()
                })
                .count()
        })
        .unwrap_or(0)
}

/// Bulk-import a crawl CSV. Works on partial CSVs: the write format is
/// append-only and line-oriented, so a still-growing file imports cleanly.
pub fn import_csv(
    client: &SearchClient,
    index: &str,
    csv_path: &Path,
    batch_size: usize,
) -> Result<()> {
    let site = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut reader = open_csv(csv_path)?;

    let mut batch = String::new();
    let mut in_batch = 0_usize;
    let mut total = 0_usize;
    let mut errors = 0_usize;
    for row in reader.records() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping malformed row: {e}");
                errors += 1;
                continue;
            }
        };
        let Some(record) = CsvRecord::from_row(&row) else {
            log::warn!("skipping row with {} fields", row.len());
            errors += 1;
            continue;
        };
        batch.push_str(&json!({"index": {"_index": index, "_id": record.doc_id()}}).to_string());
        batch.push('\n');
        batch.push_str(&record.to_document(&site).to_string());
        batch.push('\n');
        in_batch += 1;

        if in_batch >= batch_size {
            let response = client.bulk(std::mem::take(&mut batch))?;
            errors += bulk_errors(&response);
            total += in_batch;
            in_batch = 0;
            log::info!("Imported {total} documents, {errors} errors");
        }
    }
    if in_batch > 0 {
        let response = client.bulk(std::mem::take(&mut batch))?;
        errors += bulk_errors(&response);
        total += in_batch;
    }
    client.post_json(&format!("/{index}/_refresh"), &json!({}))?;
    log::info!("Done: {total} documents imported, {errors} errors");
    Ok(())
}

/// Delete every document listed in a crawl CSV (by logical-URL id).
pub fn delete_csv(
    client: &SearchClient,
    index: &str,
    csv_path: &Path,
    batch_size: usize,
) -> Result<()> {
    let mut reader = open_csv(csv_path)?;
    let mut batch = String::new();
    let mut in_batch = 0_usize;
    let mut total = 0_usize;
    let mut errors = 0_usize;
    for row in reader.records() {
        let Ok(row) = row else { continue };
        let Some(url) = row.get(1) else { continue };
        batch.push_str(&json!({"delete": {"_index": index, "_id": md5_hex(url)}}).to_string());
        batch.push('\n');
        in_batch += 1;
        if in_batch >= batch_size {
            let response = client.bulk(std::mem::take(&mut batch))?;
            errors += bulk_errors(&response);
            total += in_batch;
            in_batch = 0;
        }
    }
    if in_batch > 0 {
        let response = client.bulk(std::mem::take(&mut batch))?;
        errors += bulk_errors(&response);
        total += in_batch;
    }
    client.post_json(&format!("/{index}/_refresh"), &json!({}))?;
    log::info!("Done: {total} documents deleted, {errors} errors");
    Ok(())
}

/// Ranked search with highlighting. Field boosts put URL hits far above
/// title hits, and title hits above body hits.
pub fn query(
    client: &SearchClient,
    index: &str,
    query: &str,
    count: usize,
    offset: usize,
) -> Result<()> {
    let sanitized: String = query.chars().filter(|c| !"<>;".contains(*c)).collect();
    let body = json!({
        "size": count,
        "from": offset,
        "query": {
            "query_string": {
                "query": sanitized,
                "fields": ["inurl^100", "intitle^50", "intext^5"],
                "default_operator": "AND",
                "fuzziness": "AUTO",
                "analyzer": "default"
            }
        },
        "highlight": {
            "order": "score",
            "fields": {
                "*": {
                    "pre_tags": [">>"],
                    "post_tags": ["<<"],
                    "fragment_size": 50,
                    "number_of_fragments": 3
                }
            }
        }
    });
    let response = client.post_json(&format!("/{index}/_search"), &body)?;

    let total = response["hits"]["total"]["value"].as_u64().unwrap_or(0);
    println!("{}", format!("Found {total} results").cyan());
    println!();

    for hit in response["hits"]["hits"].as_array().into_iter().flatten() {
        let src = &hit["_source"];
        let uri = src["inurl"].as_str().unwrap_or("");
        let server = src["server"].as_str().unwrap_or("");
        let share = src["share"].as_str().unwrap_or("");
        let id = hit["_id"].as_str().unwrap_or("");
        let location = if server.is_empty() {
            String::new()
        } else {
            format!(" [{server}/{share}]")
        };
        println!(
            "{}{} {}",
            uri.green(),
            location.cyan(),
            id.bright_black()
        );
        if let Some(fragments) = hit["highlight"]["intext"].as_array() {
            let joined: Vec<&str> = fragments.iter().filter_map(|f| f.as_str()).collect();
            println!("{}", joined.join(" ... "));
        }
        println!();
    }
    Ok(())
}

/// Print the cached text of one document.
pub fn cache(client: &SearchClient, index: &str, doc_id: &str) -> Result<()> {
    let response = client.get(&format!("/{index}/_doc/{doc_id}"))?;
    let text = response["_source"]["intext"].as_str().unwrap_or("");
    println!("{text}");
    Ok(())
}

/// Copy an index to a new name via a server-side reindex.
pub fn copy_index(client: &SearchClient, src: &str, dst: &str) -> Result<()> {
    let body = json!({
        "source": {"index": src},
        "dest": {"index": dst}
    });
    let response = client.post_json("/_reindex", &body)?;
    log::info!("Copied {src} to {dst}");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub fn drop_index(client: &SearchClient, index: &str) -> Result<()> {
    client.delete(&format!("/{index}"))?;
    log::info!("Index deleted: {index}");
    Ok(())
}

/// List non-system indexes with document counts.
pub fn list_indexes(client: &SearchClient) -> Result<()> {
    let response = client.get("/_cat/indices?format=json")?;
    let mut rows: Vec<(&str, &str)> = response
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|idx| {
            let name = idx["index"].as_str()?;
            (!name.starts_with('.')).then(|| (name, idx["docs.count"].as_str().unwrap_or("0")))
        })
        .collect();
    rows.sort();
    for (name, docs) in rows {
        println!("{name}: {docs} documents");
    }
    Ok(())
}

pub fn index_info(client: &SearchClient, index: &str) -> Result<()> {
    let settings = client.get(&format!("/{index}/_settings"))?;
    let mappings = client.get(&format!("/{index}/_mapping"))?;
    let combined = json!({"settings": settings, "mappings": mappings});
    println!("{}", serde_json::to_string_pretty(&combined)?);
    Ok(())
}
