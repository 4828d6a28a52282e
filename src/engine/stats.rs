//! Process-wide run counters, shared across workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::types::CrawlCounts;

/// Monotonic counters for one crawl run. Updated with relaxed atomic
/// increments from every worker.
pub struct CrawlStats {
    pub files_total: AtomicUsize,
    pub files_processed: AtomicUsize,
    pub files_skipped: AtomicUsize,
    pub files_error: AtomicUsize,
    pub nested_dropped: AtomicUsize,
    pub start_time: Instant,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            files_total: AtomicUsize::new(0),
            files_processed: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
            files_error: AtomicUsize::new(0),
            nested_dropped: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_total(&self, n: usize) {
        self.files_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_error(&self) {
        self.files_error.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_nested_dropped(&self) {
        self.nested_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counts(&self) -> CrawlCounts {
        CrawlCounts {
            files_total: self.files_total.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_error: self.files_error.load(Ordering::Relaxed),
            nested_dropped: self.nested_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}
