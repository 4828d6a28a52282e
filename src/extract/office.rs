//! Office document adapters: OLE-era Word/Excel and the zip-over-xml
//! packaged formats (docx/xlsx/pptx, OpenDocument, Visio). Packaged
//! formats also expose a media probe + extraction used for OCR re-entry
//! when the text layer is sparse.

use anyhow::Result;
use std::io::Read;
use std::path::Path;

use super::commands;
use super::sanitize::{sanitize_text, strip_tags};
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;
use crate::scratch::ScratchDir;

/// True when the file starts with the zip local-header magic, i.e. it is a
/// packaged (OOXML/ODF) document rather than an OLE compound one.
fn is_zip_packaged(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map(|_| magic == [0x50, 0x4b, 0x03, 0x04])
        .unwrap_or(false)
}

/// Pull named zip members to stdout and strip their markup.
fn packaged_member_text(path: &Path, member_glob: &str, ctx: &ExtractCtx) -> Result<String> {
    let out = ctx.run(
        ExternalCommand::new(commands::UNZIP)
            .arg("-p")
            .arg_path(path)
            .arg(member_glob),
    )?;
    Ok(sanitize_text(&strip_tags(&out.stdout_text())))
}

/// `unzip -l` probe: does the package carry embedded media members?
fn has_media(path: &Path, media_glob: &str, ctx: &ExtractCtx) -> bool {
    ctx.run(
        ExternalCommand::new(commands::UNZIP)
            .arg("-l")
            .arg_path(path)
            .arg(media_glob),
    )
    .map(|out| out.success())
    .unwrap_or(false)
}

/// Extract embedded media members flat into a scratch dir for OCR re-entry.
fn extract_media(
    path: &Path,
    media_glob: &str,
    ctx: &ExtractCtx,
) -> Result<Option<ScratchDir>> {
    let scratch = ctx.scratch.allocate("office-media")?;
    ctx.run(
        ExternalCommand::new(commands::UNZIP)
            .arg("-o")
            .arg("-j")
            .arg("-qq")
            .arg_path(path)
            .arg(media_glob)
            .arg("-d")
            .arg_path(scratch.path()),
    )?;
    if scratch.is_empty() {
        return Ok(None);
    }
    Ok(Some(scratch))
}

/// Shared flow for packaged formats: member text, then conditional media
/// extraction when the text layer is sparse.
fn extract_packaged(
    path: &Path,
    text_glob: &str,
    media_glob: &str,
    ctx: &ExtractCtx,
) -> Result<Extraction> {
    let text = packaged_member_text(path, text_glob, ctx)?;
    let scratch = if ctx.is_sparse(&text) && has_media(path, media_glob, ctx) {
        extract_media(path, media_glob, ctx)?
    } else {
        None
    };
    Ok(Extraction { text, scratch })
}

pub fn extract_word(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    if is_zip_packaged(path) {
        return extract_packaged(path, "word/document.xml", "word/media/*", ctx);
    }
    // OLE-era .doc: antiword, with catdoc as the fallback dumper.
    let text = ctx
        .run_capture(ExternalCommand::new(commands::ANTIWORD).arg_path(path))
        .ok()
        .filter(|t| !t.is_empty());
    let text = match text {
        Some(t) => t,
        None => ctx.run_capture(ExternalCommand::new(commands::CATDOC).arg_path(path))?,
    };
    Ok(Extraction::text_only(text))
}

pub fn extract_excel(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    if is_zip_packaged(path) {
        return extract_packaged(path, "xl/sharedStrings.xml", "xl/media/*", ctx);
    }
    let text = ctx.run_capture(ExternalCommand::new(commands::XLS2CSV).arg_path(path))?;
    Ok(Extraction::text_only(text))
}

pub fn extract_powerpoint(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    extract_packaged(path, "ppt/slides/*.xml", "ppt/media/*", ctx)
}

/// Visio and OpenDocument share the packaged path; member layout differs,
/// so try the ODF content member first and fall back to Visio pages.
pub fn extract_visio(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = packaged_member_text(path, "content.xml", ctx)?;
    if !text.is_empty() {
        let scratch = if ctx.is_sparse(&text) && has_media(path, "Pictures/*", ctx) {
            extract_media(path, "Pictures/*", ctx)?
        } else {
            None
        };
        return Ok(Extraction { text, scratch });
    }
    extract_packaged(path, "visio/pages/*.xml", "visio/media/*", ctx)
}
