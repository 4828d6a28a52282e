//! Media adapters: image metadata + OCR, audio metadata + transcription,
//! video metadata + keyframe/audio-track extraction for re-entry.

use anyhow::Result;
use std::path::Path;

use super::commands;
use super::{ExtractCtx, Extraction};
use crate::engine::command::ExternalCommand;
use crate::engine::hashing::md5_hex;

/// Short tag/value metadata dump shared by the media families.
fn exif_metadata(path: &Path, ctx: &ExtractCtx) -> String {
    ctx.run_capture(
        ExternalCommand::new(commands::EXIFTOOL)
            .arg("-S")
            .arg("-q")
            .arg_path(path),
    )
    .unwrap_or_default()
}

/// Save a resized thumbnail under the configured images dir. Best effort;
/// failures are logged and never affect the record.
fn save_thumbnail(path: &Path, ctx: &ExtractCtx) {
    let Some(ref images_dir) = ctx.cfg.images_dir else {
        return;
    };
    if std::fs::create_dir_all(images_dir).is_err() {
        return;
    }
    let out = images_dir.join(format!("{}.png", md5_hex(&path.to_string_lossy())));
    let result = ctx.run(
        ExternalCommand::new(commands::CONVERT)
            .arg_path(path)
            .arg("-resize")
            .arg("320x320>")
            .arg_path(&out),
    );
    if let Err(e) = result {
        log::debug!("thumbnail for {} failed: {e:#}", path.display());
    }
}

/// Image: metadata plus multi-language OCR (unless disabled).
pub fn extract_image(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    save_thumbnail(path, ctx);

    let mut text = exif_metadata(path, ctx);
    if !ctx.cfg.ocr_disabled {
        let langs = ctx.cfg.ocr_languages.join("+");
        let ocr = ctx.run_capture(
            ExternalCommand::new(commands::TESSERACT)
                .arg_path(path)
                .arg("stdout")
                .arg("-l")
                .arg(langs),
        )?;
        if !ocr.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&ocr);
        }
    }
    Ok(Extraction::text_only(text))
}

/// Audio: metadata plus speech transcription (unless disabled). The
/// transcriber writes its transcript into a private scratch dir that never
/// re-enters the engine.
pub fn extract_audio(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let mut text = exif_metadata(path, ctx);
    if ctx.cfg.audio_disabled {
        return Ok(Extraction::text_only(text));
    }

    let work = ctx.scratch.allocate("transcribe")?;
    ctx.run(
        ExternalCommand::new(commands::WHISPER)
            .arg("--task")
            .arg("transcribe")
            .arg("--language")
            .arg(ctx.cfg.ocr_languages.first().map(String::as_str).unwrap_or("en"))
            .arg("--output_format")
            .arg("txt")
            .arg("--output_dir")
            .arg_path(work.path())
            .arg_path(path),
    )?;
    for part in work.regular_files() {
        if part.extension().is_some_and(|e| e == "txt")
            && let Ok(transcript) = std::fs::read_to_string(&part)
        {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&super::sanitize_text(&transcript));
        }
    }
    Ok(Extraction::text_only(text))
}

/// Video: metadata as text; keyframes and the audio track go into scratch
/// so they re-enter as image/audio files.
pub fn extract_video(path: &Path, ctx: &ExtractCtx) -> Result<Extraction> {
    let text = ctx.run_capture(
        ExternalCommand::new(commands::FFPROBE)
            .arg("-v")
            .arg("quiet")
            .arg("-show_format")
            .arg("-show_streams")
            .arg_path(path),
    )?;

    if ctx.cfg.ocr_disabled {
        return Ok(Extraction::text_only(text));
    }

    let scratch = ctx.scratch.allocate("video")?;
    let frames = scratch.path().join("key%04d.jpg");
    let keyframes = ctx.run(
        ExternalCommand::new(commands::FFMPEG)
            .arg("-v")
            .arg("quiet")
            .arg("-skip_frame")
            .arg("nokey")
            .arg("-i")
            .arg_path(path)
            .arg("-fps_mode")
            .arg("vfr")
            .arg_path(&frames),
    );
    if let Err(e) = keyframes {
        log::debug!("keyframe sampling for {} failed: {e:#}", path.display());
    }
    if !ctx.cfg.audio_disabled {
        let track = scratch.path().join("audio.wav");
        let audio = ctx.run(
            ExternalCommand::new(commands::FFMPEG)
                .arg("-v")
                .arg("quiet")
                .arg("-i")
                .arg_path(path)
                .arg("-vn")
                .arg_path(&track),
        );
        if let Err(e) = audio {
            log::debug!("audio track extraction for {} failed: {e:#}", path.display());
        }
    }

    let scratch = (!scratch.is_empty()).then_some(scratch);
    Ok(Extraction { text, scratch })
}
