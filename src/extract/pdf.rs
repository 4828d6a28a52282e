//! PDF adapter: text layer first; when the layer is sparse (scanned
//! documents), page images go into scratch for OCR re-entry.

use anyhow::Result;
use std::path::Path;

use super::commands;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;

pub fn extract_pdf(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::PDFTOTEXT)
            .arg("-q")
            .arg_path(path)
            .arg("-"),
    )?;

    if !ctx.is_sparse(&text) {
        return Ok(Extraction::text_only(text));
    }

    let scratch = ctx.scratch.allocate("pdf-images")?;
    let prefix = scratch.path().join("img");
    ctx.run(
        ExternalCommand::new(commands::PDFIMAGES)
            .arg("-j")
            .arg_path(path)
            .arg_path(&prefix),
    )?;
    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction { text, scratch })
}
