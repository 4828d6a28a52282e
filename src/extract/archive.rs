//! Container adapters: archive listing + full extraction into scratch.
//! The listing is the record's text; the unpacked payload re-enters the
//! engine as nested files.

use anyhow::Result;
use std::path::Path;

use super::commands;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;
use crate::mapper::extension_of;

enum Unpacker {
    Unzip,
    Unrar,
    Tar,
    SevenZip,
}

/// Pick the unpacker from the filename; anything unrecognized goes to 7z,
/// which reads most container formats including msi, cab, rpm and deb.
fn unpacker_for(path: &Path) -> Unpacker {
    match extension_of(path).as_str() {
        "zip" | "jar" | "war" | "ear" => Unpacker::Unzip,
        "rar" => Unpacker::Unrar,
        "tar" | "tgz" | "gz" | "tbz" | "bz2" | "txz" | "xz" => Unpacker::Tar,
        _ => Unpacker::SevenZip,
    }
}

fn list_command(path: &Path, unpacker: &Unpacker) -> ExternalCommand {
    match unpacker {
        Unpacker::Unzip => ExternalCommand::new(commands::UNZIP).arg("-l").arg_path(path),
        Unpacker::Unrar => ExternalCommand::new(commands::UNRAR).arg("lb").arg_path(path),
        Unpacker::Tar => ExternalCommand::new(commands::TAR).arg("-tf").arg_path(path),
        Unpacker::SevenZip => ExternalCommand::new(commands::SEVENZIP).arg("l").arg_path(path),
    }
}

fn extract_command(path: &Path, dest: &Path, unpacker: &Unpacker) -> ExternalCommand {
    match unpacker {
        Unpacker::Unzip => ExternalCommand::new(commands::UNZIP)
            .arg("-o")
            .arg("-qq")
            .arg_path(path)
            .arg("-d")
            .arg_path(dest),
        Unpacker::Unrar => ExternalCommand::new(commands::UNRAR)
            .arg("x")
            .arg("-y")
            .arg("-inul")
            .arg_path(path)
            .arg_path(dest),
        Unpacker::Tar => ExternalCommand::new(commands::TAR)
            .arg("-xf")
            .arg_path(path)
            .arg("-C")
            .arg_path(dest),
        Unpacker::SevenZip => ExternalCommand::new(commands::SEVENZIP)
            .arg("x")
            .arg("-y")
            .arg(format!("-o{}", dest.display()))
            .arg_path(path),
    }
}

fn list_and_unpack(path: &Path, unpacker: Unpacker, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(list_command(path, &unpacker))?;
    let scratch = ctx.scratch.allocate("archive")?;
    ctx.run(extract_command(path, scratch.path(), &unpacker))?;
    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction { text, scratch })
}

/// Generic archive: zip, rar, tar, gz, 7z, msi, jar, cab.
pub fn extract_archive(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    list_and_unpack(path, unpacker_for(path), ctx)
}

/// Software packages (rpm, deb): 7z understands both payload formats.
pub fn extract_package(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    list_and_unpack(path, Unpacker::SevenZip, ctx)
}
