//! Windows-specific adapters: shortcut metadata, PE/ELF string dumps,
//! Thumbs.db thumbnail stores, EVTX event logs, Outlook .msg conversion.

use anyhow::Result;
use std::path::Path;

use super::commands;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;

/// Shortcut (.lnk) metadata dump: target path, arguments, icon location.
pub fn extract_lnk(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(ExternalCommand::new(commands::LNKINFO).arg_path(path))?;
    Ok(Extraction::text_only(text))
}

/// Printable-string dump of executables; catches embedded credentials,
/// URLs, and build paths.
pub fn extract_strings(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::STRINGS)
            .arg("-n")
            .arg("8")
            .arg_path(path),
    )?;
    Ok(Extraction::text_only(text))
}

/// Thumbs.db: recover cached thumbnails into scratch; the images re-enter
/// the pipeline for OCR.
pub fn extract_thumbsdb(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let scratch = ctx.scratch.allocate("thumbsdb")?;
    let text = ctx.run_capture(
        ExternalCommand::new(commands::VINETTO)
            .arg("-o")
            .arg_path(scratch.path())
            .arg_path(path),
    )?;
    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction { text, scratch })
}

/// EVTX event log: JSON-lines dump of every record.
pub fn extract_evtx(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::EVTX_DUMP)
            .arg("-o")
            .arg("jsonl")
            .arg_path(path),
    )?;
    Ok(Extraction::text_only(text))
}

/// Outlook .msg: convert to a normalized RFC-822 mail in scratch; the
/// message adapter picks it up as a nested file.
pub fn extract_msg(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let scratch = ctx.scratch.allocate("msg")?;
    let out_path = scratch.path().join("message.eml");
    ctx.run(
        ExternalCommand::new(commands::MSGCONVERT)
            .arg("--outfile")
            .arg_path(&out_path)
            .arg_path(path),
    )?;
    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction {
        text: String::new(),
        scratch,
    })
}
