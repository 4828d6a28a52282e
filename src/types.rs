//! Public and internal types for the sharecrawl API and pipeline.

use std::path::PathBuf;
use std::str::FromStr;

/// Closed set of document classes a file can be assigned during
/// classification. Drives extractor dispatch and ends up in the CSV
/// `class` field and the search index `filetype` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocClass {
    Html,
    Text,
    Word,
    Excel,
    Powerpoint,
    Visio,
    Pdf,
    Lnk,
    Executable,
    Image,
    Audio,
    Video,
    Thumbsdb,
    Archive,
    Package,
    Bytecode,
    Winevent,
    Message,
    Sqlite,
    Pcap,
    Raw,
    Unknown,
}

impl DocClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocClass::Html => "html",
            DocClass::Text => "text",
            DocClass::Word => "word",
            DocClass::Excel => "excel",
            DocClass::Powerpoint => "powerpoint",
            DocClass::Visio => "visio",
            DocClass::Pdf => "pdf",
            DocClass::Lnk => "lnk",
            DocClass::Executable => "executable",
            DocClass::Image => "image",
            DocClass::Audio => "audio",
            DocClass::Video => "video",
            DocClass::Thumbsdb => "thumbsdb",
            DocClass::Archive => "archive",
            DocClass::Package => "package",
            DocClass::Bytecode => "bytecode",
            DocClass::Winevent => "winevent",
            DocClass::Message => "message",
            DocClass::Sqlite => "sqlite",
            DocClass::Pcap => "pcap",
            DocClass::Raw => "raw",
            DocClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted CSV row. Built by the engine after extraction; encoded by the
/// index writer.
#[derive(Clone, Debug)]
pub struct FileRecord {
    /// Unix seconds at emission time.
    pub timestamp: i64,
    /// Browser-clickable URL derived from the root's protocol prefix, with
    /// `#<name>` appended for nested files.
    pub logical_url: String,
    /// On-disk location actually read. For nested files this is the
    /// containing document, not the scratch path.
    pub physical_path: PathBuf,
    pub server: String,
    pub share: String,
    /// Filename suffix after the last dot, empty if none.
    pub extension: String,
    pub class: DocClass,
    /// UTF-8 text, already stripped of control characters and commas.
    pub content: String,
}

/// Content hash algorithm for the dedup store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashAlgo {
    #[default]
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgo::Md5 => "md5",
            HashAlgo::Sha1 => "sha1",
            HashAlgo::Sha256 => "sha256",
        }
    }
}

impl FromStr for HashAlgo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgo::Md5),
            "sha1" => Ok(HashAlgo::Sha1),
            "sha256" => Ok(HashAlgo::Sha256),
            other => anyhow::bail!("unknown hash algorithm: {other} (md5/sha1/sha256)"),
        }
    }
}

/// Session store backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionBackend {
    /// Embedded relational store with an atomic claim; safe for multiple
    /// workers and multiple processes.
    #[default]
    Sqlite,
    /// Flat append-only text file behind an exclusive lock. Only valid for
    /// single-process, single-worker runs.
    AppendText,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "relational" => Ok(SessionBackend::Sqlite),
            "append-text" | "text" => Ok(SessionBackend::AppendText),
            other => anyhow::bail!("unknown session backend: {other} (sqlite/append-text)"),
        }
    }
}

/// Counters returned by a completed crawl.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrawlCounts {
    pub files_total: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_error: usize,
    /// Nested files dropped because the depth or fan-out bound was hit.
    pub nested_dropped: usize,
}
