//! Scratch directory management: uniquely-named temp directories with
//! guaranteed cleanup on every exit path, including signal-triggered
//! shutdown.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Allocates scratch directories under a per-run root and tracks every live
/// allocation. The per-run root is removed wholesale by [`cleanup_all`], so
/// even a directory whose owner never dropped it cannot survive the run.
///
/// [`cleanup_all`]: ScratchManager::cleanup_all
#[derive(Clone)]
pub struct ScratchManager {
    run_root: PathBuf,
    live: Arc<Mutex<Vec<PathBuf>>>,
}

/// One allocated scratch directory. Removed on drop; deregistered from the
/// manager at the same time.
pub struct ScratchDir {
    dir: Option<tempfile::TempDir>,
    live: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScratchManager {
    /// Create the per-run scratch root under `temp_dir`. The directory name
    /// carries the pid so stale roots from crashed runs are identifiable.
    pub fn new(temp_dir: &Path) -> Result<Self> {
        let run_root = temp_dir.join(format!("{}-{}", env!("CARGO_PKG_NAME"), std::process::id()));
        std::fs::create_dir_all(&run_root)
            .with_context(|| format!("create scratch root {}", run_root.display()))?;
        Ok(Self {
            run_root,
            live: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Allocate a fresh scratch directory. The `label` lands in the dir name
    /// for debuggability only.
    pub fn allocate(&self, label: &str) -> Result<ScratchDir> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{label}-"))
            .tempdir_in(&self.run_root)
            .with_context(|| format!("allocate scratch dir under {}", self.run_root.display()))?;
        self.live.lock().unwrap().push(dir.path().to_path_buf());
        Ok(ScratchDir {
            dir: Some(dir),
            live: Arc::clone(&self.live),
        })
    }

    /// Remove the whole per-run scratch root. Called on engine completion
    /// and from the shutdown path; idempotent.
    pub fn cleanup_all(&self) {
        self.live.lock().unwrap().clear();
        if self.run_root.exists()
            && let Err(e) = std::fs::remove_dir_all(&self.run_root)
        {
            log::warn!("could not remove scratch root {}: {e}", self.run_root.display());
        }
    }

    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    /// Number of live scratch directories (test hook).
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        self.dir.as_ref().expect("scratch dir taken").path()
    }

    /// Regular files currently in the scratch dir, sorted by name so nested
    /// processing order is deterministic.
    pub fn regular_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(self.path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    pub fn is_empty(&self) -> bool {
        self.regular_files().is_empty()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            self.live.lock().unwrap().retain(|p| p != &path);
            // TempDir drop removes the tree; errors are already logged by
            // the final cleanup_all sweep.
            drop(dir);
        }
    }
}
