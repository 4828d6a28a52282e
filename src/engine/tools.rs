//! Discovery filtering, output naming, and shutdown plumbing.

use anyhow::{Context, Result};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

/// Predicate applied to every discovered regular file. All bounds optional;
/// an empty filter accepts everything.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryFilter {
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    /// Substring exclusions applied to the full path (the `exclude-dirs`
    /// key plus CLI additions).
    pub exclude_dirs: Vec<String>,
    /// Filename glob (`*` and `?`).
    pub name_pattern: Option<String>,
    /// Only files modified within the last N days.
    pub mtime_within_days: Option<u64>,
}

impl DiscoveryFilter {
    pub fn matches(&self, path: &Path, meta: &Metadata) -> bool {
        let size = meta.len();
        if self.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.max_size.is_some_and(|max| size > max) {
            return false;
        }
        let path_str = path.to_string_lossy();
        if self.exclude_dirs.iter().any(|sub| path_str.contains(sub.as_str())) {
            return false;
        }
        if let Some(ref pattern) = self.name_pattern {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !glob_match(pattern, name) {
                return false;
            }
        }
        if let Some(days) = self.mtime_within_days {
            let cutoff = SystemTime::now() - Duration::from_secs(days * 86_400);
            match meta.modified() {
                Ok(mtime) if mtime >= cutoff => {}
                _ => return false,
            }
        }
        true
    }
}

/// Simple glob pattern matching (supports * and ?).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                while text_chars.peek().is_some() {
                    if glob_match(
                        &pattern_chars.clone().collect::<String>(),
                        &text_chars.clone().collect::<String>(),
                    ) {
                        return true;
                    }
                    text_chars.next();
                }
                return false;
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}

/// Flatten a root path into the output stem: separators become underscores,
/// leading/trailing separators dropped. `smb/fs01/share` → `smb_fs01_share`.
pub fn output_stem(root: &Path) -> String {
    let flat: String = root
        .to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    flat.trim_matches('_').to_string()
}

/// Output CSV path for a root, in the working directory.
pub fn output_csv_path(root: &Path) -> PathBuf {
    PathBuf::from(format!("{}.csv", output_stem(root)))
}

/// Hidden session-store path for a root.
pub fn session_db_path(root: &Path) -> PathBuf {
    PathBuf::from(format!(".{}.session.db", output_stem(root)))
}

/// Hidden dedup-store path for a root.
pub fn dedupe_db_path(root: &Path) -> PathBuf {
    PathBuf::from(format!(".{}.dedupe.db", output_stem(root)))
}

/// Unix seconds now, for record timestamps.
pub fn now_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Setup Ctrl+C handler and return the shared cancellation flag.
pub fn setup_ctrlc_handler() -> Result<Arc<AtomicBool>> {
    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);

    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;
    Ok(cancel_requested)
}
