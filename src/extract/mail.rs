//! Mail adapter: RFC-822 body extraction plus attachment unpacking.
//! Outlook `.msg` blobs are routed through the converter first and re-enter
//! as normal mail.

use anyhow::Result;
use std::io::Read;
use std::path::Path;

use super::commands;
use super::sanitize::sanitize_text;
use super::windows;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;

const OLE_MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

fn is_ole_msg(path: &Path) -> bool {
    let mut magic = [0u8; 8];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map(|_| magic == OLE_MAGIC)
        .unwrap_or(false)
}

/// Mail message: unpack MIME parts into scratch. Text parts become the body
/// and are consumed; everything else (attachments) stays in scratch for
/// nested processing.
pub fn extract_message(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    if is_ole_msg(path) {
        return windows::extract_msg(path, ctx);
    }

    let scratch = ctx.scratch.allocate("mail")?;
    ctx.run(
        ExternalCommand::new(commands::RIPMIME)
            .arg("-i")
            .arg_path(path)
            .arg("-d")
            .arg_path(scratch.path()),
    )?;

    // ripmime names inline text parts textfile<N>; fold those into the body
    // and remove them so only real attachments re-enter the engine.
    let mut body = String::new();
    for part in scratch.regular_files() {
        let name = part.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.starts_with("textfile") {
            if let Ok(bytes) = std::fs::read(&part) {
                body.push_str(&String::from_utf8_lossy(&bytes));
                body.push('\n');
            }
            let _ = std::fs::remove_file(&part);
        }
    }

    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction {
        text: sanitize_text(&body),
        scratch,
    })
}
