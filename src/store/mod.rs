//! Durable session and dedup stores.
//!
//! Both are persistent string sets with one non-negotiable property: `claim`
//! is atomic insert-if-absent. That single operation is the engine's only
//! concurrency primitive across workers and across processes.

mod sqlite;
mod text;

use anyhow::Result;
use std::path::Path;

use crate::types::SessionBackend;
pub use sqlite::SqliteSet;
pub use text::TextSet;

/// Unix seconds now, for claim timestamps.
pub(crate) fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

enum Backend {
    Sqlite(SqliteSet),
    Text(TextSet),
}

impl Backend {
    fn claim(&self, key: &str, meta: &str) -> Result<bool> {
        match self {
            Backend::Sqlite(s) => s.claim(key, meta),
            Backend::Text(s) => s.claim(key),
        }
    }

    fn contains(&self, key: &str) -> Result<bool> {
        match self {
            Backend::Sqlite(s) => s.contains(key),
            Backend::Text(s) => s.contains(key),
        }
    }

    fn count(&self) -> Result<usize> {
        match self {
            Backend::Sqlite(s) => s.count(),
            Backend::Text(s) => s.count(),
        }
    }
}

/// Durable "processed" set keyed by physical path. An entry means "do not
/// process this path again, this run or any later run against the same
/// store". Entries are inserted on claim and never updated by the engine.
pub struct SessionStore {
    backend: Backend,
}

impl SessionStore {
    /// Open or create the store at `path` (idempotent).
    pub fn open(path: &Path, backend: SessionBackend) -> Result<Self> {
        let backend = match backend {
            SessionBackend::Sqlite => Backend::Sqlite(SqliteSet::open_session(path)?),
            SessionBackend::AppendText => Backend::Text(TextSet::open(path)?),
        };
        Ok(Self { backend })
    }

    /// Atomically claim `path`. Returns true when this caller inserted the
    /// entry and therefore owns processing of the file.
    pub fn claim(&self, path: &str) -> Result<bool> {
        self.backend.claim(path, "done")
    }

    pub fn contains(&self, path: &str) -> Result<bool> {
        self.backend.contains(path)
    }

    pub fn count(&self) -> Result<usize> {
        self.backend.count()
    }
}

/// Durable content-hash set. A hit means a byte-identical file was already
/// emitted at some point in the store's lifetime; the current file is
/// skipped without a record.
pub struct DedupStore {
    inner: SqliteSet,
}

impl DedupStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            inner: SqliteSet::open_dedup(path)?,
        })
    }

    /// Atomically record `hash`. Returns true when the hash was new (the
    /// caller's file is the first sighting and should be emitted).
    pub fn claim(&self, hash: &str, first_path: &str) -> Result<bool> {
        self.inner.claim(hash, first_path)
    }

    pub fn contains(&self, hash: &str) -> Result<bool> {
        self.inner.contains(hash)
    }

    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }
}
