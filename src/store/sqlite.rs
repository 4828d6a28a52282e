//! Embedded relational backend for the session and dedup stores.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use super::now_secs;

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Applied
/// after `PRAGMA journal_mode = WAL`.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

const SESSION_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS processed (
    path TEXT PRIMARY KEY,
    claimed_at INTEGER NOT NULL,
    status TEXT NOT NULL
);
"#;

const DEDUP_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS hashes (
    hash TEXT PRIMARY KEY,
    first_path TEXT NOT NULL,
    inserted_at INTEGER NOT NULL
);
"#;

/// A uniqueness-keyed table behind one shared connection. The claim relies
/// on the primary-key constraint: `INSERT OR IGNORE` either changes one row
/// (claimed) or zero (someone was first).
pub struct SqliteSet {
    conn: Mutex<Connection>,
    table: &'static str,
    key_col: &'static str,
    insert_sql: &'static str,
}

fn open_with_schema(path: &Path, schema: &str) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("open store database {}", path.display()))?;
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(schema).context("create schema")?;
    Ok(conn)
}

impl SqliteSet {
    pub fn open_session(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_with_schema(path, SESSION_SCHEMA)?),
            table: "processed",
            key_col: "path",
            insert_sql:
                "INSERT OR IGNORE INTO processed (path, claimed_at, status) VALUES (?1, ?2, ?3)",
        })
    }

    pub fn open_dedup(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(open_with_schema(path, DEDUP_SCHEMA)?),
            table: "hashes",
            key_col: "hash",
            insert_sql:
                "INSERT OR IGNORE INTO hashes (hash, first_path, inserted_at) VALUES (?1, ?3, ?2)",
        })
    }

    /// Insert-if-absent. Returns true when this call inserted the row.
    /// `meta` is the status (session) or first-seen path (dedup).
    pub fn claim(&self, key: &str, meta: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(self.insert_sql, rusqlite::params![key, now_secs(), meta])
            .context("claim insert")?;
        Ok(changed == 1)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", self.table, self.key_col);
        let mut stmt = conn.prepare_cached(&sql).context("prepare contains")?;
        let found = stmt.exists([key]).context("contains query")?;
        Ok(found)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let n: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .context("count query")?;
        Ok(n.max(0) as usize)
    }
}
