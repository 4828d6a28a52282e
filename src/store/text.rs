//! Flat-file backend: one key per line, appended under an exclusive flock.
//! Valid only under the single-process, single-worker invariant; the engine
//! enforces worker count 1 when this backend is selected.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct TextSet {
    path: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    file: File,
    seen: HashSet<String>,
}

#[cfg(unix)]
fn with_flock<T>(file: &File, f: impl FnOnce() -> Result<T>) -> Result<T> {
    use std::os::fd::AsRawFd;
    let fd = file.as_raw_fd();
    if unsafe { libc::flock(fd, libc::LOCK_EX) } != 0 {
        return Err(std::io::Error::last_os_error()).context("lock session file");
    }
    let result = f();
    unsafe { libc::flock(fd, libc::LOCK_UN) };
    result
}

#[cfg(not(unix))]
fn with_flock<T>(_file: &File, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f()
}

impl TextSet {
    pub fn open(path: &Path) -> Result<Self> {
        let mut seen = HashSet::new();
        if path.is_file() {
            let reader = BufReader::new(
                File::open(path).with_context(|| format!("open session file {}", path.display()))?,
            );
            for line in reader.lines() {
                let line = line.context("read session file")?;
                if !line.is_empty() {
                    seen.insert(line);
                }
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open session file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, seen }),
        })
    }

    pub fn claim(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.seen.contains(key) {
            return Ok(false);
        }
        inner.seen.insert(key.to_string());
        let file = &inner.file;
        with_flock(file, || {
            writeln!(&*file, "{key}")
                .with_context(|| format!("append to {}", self.path.display()))
        })?;
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.inner.lock().unwrap().seen.contains(key))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.inner.lock().unwrap().seen.len())
    }
}
