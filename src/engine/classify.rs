//! MIME classification: external `file` probe first, extension-based guess
//! when the probe is unavailable or fails.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::engine::command::ExternalCommand;
use crate::engine::registry;
use crate::extract::commands;
use crate::types::DocClass;
use crate::utils::config::MIME_PROBE_TIMEOUT_SECS;

/// Probe a file's MIME type with the external file-type tool. None on any
/// failure (tool missing, nonzero exit, timeout); classification then
/// degrades to the extension guess.
pub fn probe_mime(path: &Path, cancel: &Arc<AtomicBool>) -> Option<String> {
    let out = ExternalCommand::new(commands::FILE)
        .arg("--brief")
        .arg("--mime-type")
        .arg_path(path)
        .run(Duration::from_secs(MIME_PROBE_TIMEOUT_SECS), cancel)
        .ok()?;
    if !out.success() {
        return None;
    }
    let mime = out.stdout_text().trim().to_string();
    (!mime.is_empty()).then_some(mime)
}

/// True when the file-type tool reports the file as textual (the `unknown`
/// fallback's plain-content probe).
pub fn probe_is_text(path: &Path, cancel: &Arc<AtomicBool>) -> bool {
    let Ok(out) = ExternalCommand::new(commands::FILE)
        .arg("--brief")
        .arg_path(path)
        .run(Duration::from_secs(MIME_PROBE_TIMEOUT_SECS), cancel)
    else {
        return false;
    };
    out.success() && out.stdout_text().to_ascii_lowercase().contains("text")
}

/// Classify a file: content probe, then extension fallback, normalized
/// through the registry. MIME probe failure degrades to `unknown` via the
/// registry fallback, never to an error.
pub fn classify(path: &Path, cancel: &Arc<AtomicBool>) -> DocClass {
    if let Some(mime) = probe_mime(path, cancel) {
        let class = registry::class_for_mime(&mime);
        if class != DocClass::Unknown {
            return class;
        }
    }
    match mime_guess::from_path(path).first_raw() {
        Some(guessed) => registry::class_for_mime(guessed),
        None => DocClass::Unknown,
    }
}
