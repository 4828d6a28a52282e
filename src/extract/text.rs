//! Structured text adapters: plain text and HTML.

use anyhow::{Context, Result};
use std::path::Path;

use super::commands;
use super::sanitize::sanitize_text;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;

/// Plain text: read directly, lossy UTF-8. No external tool involved.
pub fn extract_plain(path: &Path) -> Result<Extraction> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read text file {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(Extraction::text_only(sanitize_text(&text)))
}

/// HTML: rendered to plain text by the external dumper, which also handles
/// charset detection from the document itself.
pub fn extract_html(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::LYNX)
            .arg("-dump")
            .arg("-nolist")
            .arg("-force_html")
            .arg_path(path),
    )?;
    Ok(Extraction::text_only(text))
}
