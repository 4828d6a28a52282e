//! Extractor adapters: one family per document class, all built on the
//! typed command runner. Adapters are pure with respect to the engine: they
//! produce text and optionally a scratch directory of nested files, and
//! never touch engine state.

pub mod archive;
pub mod commands;
pub mod mail;
pub mod media;
pub mod office;
pub mod opaque;
pub mod pdf;
pub mod sanitize;
pub mod text;
pub mod windows;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::engine::command::{CommandOutput, ExternalCommand};
use crate::scratch::{ScratchDir, ScratchManager};
use crate::types::DocClass;
use crate::utils::AppConfig;

pub use sanitize::{sanitize_text, strip_tags};

/// What an adapter hands back to the engine.
pub struct Extraction {
    /// Sanitized text for the CSV record. May be empty.
    pub text: String,
    /// Nested files for re-entry, when the adapter unpacked anything.
    pub scratch: Option<ScratchDir>,
}

impl Extraction {
    pub fn text_only(text: String) -> Self {
        Self { text, scratch: None }
    }

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            scratch: None,
        }
    }
}

/// Everything an adapter needs from the engine: configuration, the resolved
/// deadline for its timeout category, the scratch allocator, and the global
/// cancellation flag.
pub struct ExtractCtx<'a> {
    pub cfg: &'a AppConfig,
    pub scratch: &'a ScratchManager,
    pub cancel: &'a Arc<AtomicBool>,
    pub deadline: Duration,
}

impl ExtractCtx<'_> {
    /// Run one tool invocation under this adapter's deadline. Err means the
    /// tool could not run or was killed (timeout/cancel); a nonzero exit
    /// with partial output is a success carrying whatever was captured.
    pub fn run(&self, cmd: ExternalCommand) -> Result<CommandOutput> {
        let program = cmd.program().to_string();
        let out = cmd.run(self.deadline, self.cancel)?;
        if out.timed_out {
            anyhow::bail!("{program} timed out after {}s", self.deadline.as_secs());
        }
        if out.cancelled {
            anyhow::bail!("{program} cancelled by shutdown");
        }
        if !out.success() {
            log::debug!(
                "{program} exited {:?}: {}",
                out.exit_code,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(out)
    }

    /// Run a tool and return its sanitized stdout.
    pub fn run_capture(&self, cmd: ExternalCommand) -> Result<String> {
        let out = self.run(cmd)?;
        Ok(sanitize_text(&out.stdout_text()))
    }

    /// True when primary text is under the sparse threshold and media
    /// expansion is allowed.
    pub fn is_sparse(&self, text: &str) -> bool {
        !self.cfg.ocr_disabled && text.chars().count() < self.cfg.ocr_min_text
    }
}

/// Dispatch to the adapter family for `class`. Errors are per-file: the
/// engine records them and moves on.
pub fn extract(class: DocClass, path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    match class {
        DocClass::Html => text::extract_html(path, ctx),
        DocClass::Text => text::extract_plain(path),
        DocClass::Word => office::extract_word(path, ctx),
        DocClass::Excel => office::extract_excel(path, ctx),
        DocClass::Powerpoint => office::extract_powerpoint(path, ctx),
        DocClass::Visio => office::extract_visio(path, ctx),
        DocClass::Pdf => pdf::extract_pdf(path, ctx),
        DocClass::Lnk => windows::extract_lnk(path, ctx),
        DocClass::Executable => windows::extract_strings(path, ctx),
        DocClass::Image => media::extract_image(path, ctx),
        DocClass::Audio => media::extract_audio(path, ctx),
        DocClass::Video => media::extract_video(path, ctx),
        DocClass::Thumbsdb => windows::extract_thumbsdb(path, ctx),
        DocClass::Archive => archive::extract_archive(path, ctx),
        DocClass::Package => archive::extract_package(path, ctx),
        DocClass::Bytecode => opaque::extract_bytecode(path, ctx),
        DocClass::Winevent => windows::extract_evtx(path, ctx),
        DocClass::Message => mail::extract_message(path, ctx),
        DocClass::Sqlite => opaque::extract_sqlite(path, ctx),
        DocClass::Pcap => opaque::extract_pcap(path, ctx),
        DocClass::Raw => Ok(Extraction::empty()),
        DocClass::Unknown => opaque::extract_unknown(path, ctx),
    }
}
