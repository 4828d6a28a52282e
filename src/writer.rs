//! Concurrency-safe buffered CSV emitter for file records.
//!
//! The row format is an external contract shared with the search index
//! bridge and downstream tooling: eight comma-separated fields, the
//! timestamp bare, fields 2 through 8 always double-quoted with interior
//! quotes doubled. Carriage returns, newlines, and NULs never reach the
//! file.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::FileRecord;

/// Append-only writer for the output CSV. Buffered in memory; appends are
/// serialized behind a mutex, and each physical flush holds an exclusive
/// `flock` so multiple processes can share one output file.
pub struct IndexWriter {
    path: PathBuf,
    buffer_cap: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    file: File,
    buf: Vec<u8>,
}

/// Quote one field: wrap in double quotes, double interior quotes, drop
/// CR/LF/NUL.
fn quote_field(out: &mut String, field: &str) {
    out.push('"');
    for ch in field.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\r' | '\n' | '\0' => {}
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Encode one record as a single CSV line (no trailing newline). Public so
/// tests can verify the encoding contract directly.
pub fn encode_record(record: &FileRecord) -> String {
    let mut line = String::with_capacity(record.content.len() + 128);
    line.push_str(&record.timestamp.to_string());
    for field in [
        record.logical_url.as_str(),
        &record.physical_path.to_string_lossy(),
        record.server.as_str(),
        record.share.as_str(),
        record.extension.as_str(),
        record.class.as_str(),
        record.content.as_str(),
    ] {
        line.push(',');
        quote_field(&mut line, field);
    }
    line
}

#[cfg(unix)]
fn with_flock<T>(file: &File, f: impl FnOnce() -> Result<T>) -> Result<T> {
    use std::os::fd::AsRawFd;
    let fd = file.as_raw_fd();
    if unsafe { libc::flock(fd, libc::LOCK_EX) } != 0 {
        return Err(std::io::Error::last_os_error()).context("lock output file");
    }
    let result = f();
    unsafe { libc::flock(fd, libc::LOCK_UN) };
    result
}

#[cfg(not(unix))]
fn with_flock<T>(_file: &File, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f()
}

impl IndexWriter {
    /// Open (or create) the output file for appending.
    pub fn open(path: &Path, buffer_cap: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open output file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            buffer_cap: buffer_cap.max(1),
            inner: Mutex::new(Inner {
                file,
                buf: Vec::with_capacity(buffer_cap),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Flushes when the buffer exceeds the configured
    /// byte size. Errors here are fatal to the run: the engine halts after
    /// flushing what it can.
    pub fn append(&self, record: &FileRecord) -> Result<()> {
        let line = encode_record(record);
        let mut inner = self.inner.lock().unwrap();
        inner.buf.extend_from_slice(line.as_bytes());
        inner.buf.push(b'\n');
        if inner.buf.len() >= self.buffer_cap {
            Self::flush_inner(&mut inner, &self.path)?;
        }
        Ok(())
    }

    /// Flush buffered records to disk. Called on completion and from the
    /// shutdown path.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::flush_inner(&mut inner, &self.path)
    }

    fn flush_inner(inner: &mut Inner, path: &Path) -> Result<()> {
        if inner.buf.is_empty() {
            return Ok(());
        }
        // Write via &File (Write is implemented for it) so the flock helper
        // and the writes share one borrow.
        let file = &inner.file;
        let buf = &inner.buf;
        with_flock(file, || {
            (&*file)
                .write_all(buf)
                .with_context(|| format!("append to {}", path.display()))?;
            (&*file).flush().context("flush output file")
        })?;
        inner.buf.clear();
        Ok(())
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock()
            && let Err(e) = Self::flush_inner(&mut inner, &self.path)
        {
            log::error!("final flush of {} failed: {e:#}", self.path.display());
        }
    }
}
