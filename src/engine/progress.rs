//! Progress bar utilities for displaying crawl status.

use kdam::{Animation, Bar, BarExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage).
/// The walk thread delivers the total when discovery finishes.
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Update the bar's total once discovery has finished counting.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Update progress bar if available. Uses try_lock so contended workers
/// skip an update instead of blocking.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Increment a shared counter and update the bar every `chunk_size` items.
pub fn report_progress_batched(pb: Option<&ProgressBar>, counter: &AtomicUsize, chunk_size: usize) {
    let count = counter.fetch_add(1, Ordering::Relaxed);
    if let Some(pb) = pb
        && count > 0
        && (count + 1).is_multiple_of(chunk_size)
    {
        update_progress_bar(pb, chunk_size);
    }
}

/// Final update for the remainder after batched updates.
pub fn flush_progress_remainder(pb: Option<&ProgressBar>, total: usize, chunk_size: usize) {
    if let Some(pb) = pb {
        let remaining = total % chunk_size;
        if remaining > 0 {
            update_progress_bar(pb, remaining);
        }
    }
}

/// Clear the bar off the terminal (end of run).
pub fn clear_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.clear();
    }
}
