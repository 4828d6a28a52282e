//! Opaque-format adapters: SQLite dumps, PCAP text dumps, Python bytecode
//! disassembly, and the `unknown` fallback.

use anyhow::Result;
use std::path::Path;

use super::commands;
use super::text::extract_plain;
use super::{ExtractCtx, Extraction};
use crate::engine::classify::probe_is_text;
use crate::engine::command::ExternalCommand;

pub fn extract_sqlite(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::SQLITE3)
            .arg("-readonly")
            .arg_path(path)
            .arg(".dump"),
    )?;
    Ok(Extraction::text_only(text))
}

pub fn extract_pcap(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::TCPDUMP)
            .arg("-nn")
            .arg("-r")
            .arg_path(path),
    )?;
    Ok(Extraction::text_only(text))
}

pub fn extract_bytecode(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(ExternalCommand::new(commands::PYCDC).arg_path(path))?;
    Ok(Extraction::text_only(text))
}

/// Fallback for unclassified files: if the file-type probe says textual,
/// emit plain content; otherwise an empty record.
pub fn extract_unknown(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    if probe_is_text(path, ctx.cancel) {
        return extract_plain(path);
    }
    Ok(Extraction::empty())
}
