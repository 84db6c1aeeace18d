use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::audio_metadata::probe_audio;
use crate::chapters::{Chapter, MetadataHeader, render_metadata};
use crate::error::PrepError;
use crate::ffmpeg::run_encoder;
use crate::util::path_to_str;

/// Codec every combined file is encoded to.
pub const OUTPUT_CODEC: &str = "aac";

/// Bitrate for the combined file: the requested one, or the first input's own bitrate.
pub fn resolve_bitrate(
    files: &[PathBuf],
    requested: Option<&str>,
    debug: bool,
) -> Result<String, PrepError> {
    if let Some(bitrate) = requested {
        return Ok(bitrate.to_string());
    }
    let first = files.first().ok_or(PrepError::NoFileInput)?;
    let bit_rate = probe_audio(first, debug)?.bit_rate(first)?;
    info!("Detected bitrate {} from {}", bit_rate, first.display());
    Ok(bit_rate.to_string())
}

/// Build a concat-demuxer manifest with one absolute path per line.
pub fn render_manifest(files: &[PathBuf]) -> Result<String, PrepError> {
    let mut manifest = String::new();
    for file in files {
        let absolute = std::path::absolute(file)?;
        let quoted = absolute.to_string_lossy().replace('\'', "'\\''");
        manifest.push_str(&format!("file '{}'\n", quoted));
    }
    Ok(manifest)
}

/// Arguments for one concat-demuxer run: both inputs, chapters from the second, AAC out.
pub fn build_concat_args(
    manifest: &Path,
    metadata: &Path,
    output: &Path,
    bitrate: &str,
) -> Result<Vec<String>, PrepError> {
    let args = [
        "-y",
        "-f",
        "concat",
        "-safe",
        "0",
        "-i",
        path_to_str(manifest)?,
        "-i",
        path_to_str(metadata)?,
        "-map_metadata",
        "1",
        "-map_chapters",
        "1",
        "-map",
        "0:a",
        "-c:a",
        OUTPUT_CODEC,
        "-b:a",
        bitrate,
        "-f",
        "mp4",
        path_to_str(output)?,
    ];
    Ok(args.iter().map(|arg| arg.to_string()).collect())
}

/// The encoder binary and the directory its transient documents are created under.
struct Encoder<'a> {
    program: &'a str,
    scratch_root: PathBuf,
    debug: bool,
}

/// Concatenate `files` into `output`, re-encoded at `bitrate` with `chapters` embedded.
///
/// The manifest and metadata document live in a temporary directory that is removed
/// when this returns, whether or not ffmpeg succeeded.
pub fn concatenate_audio(
    files: &[PathBuf],
    chapters: &[Chapter],
    header: &MetadataHeader,
    output: &Path,
    bitrate: &str,
    debug: bool,
) -> Result<(), PrepError> {
    let encoder = Encoder {
        program: "ffmpeg",
        scratch_root: std::env::temp_dir(),
        debug,
    };
    concatenate_with(&encoder, files, chapters, header, output, bitrate)
}

fn concatenate_with(
    encoder: &Encoder,
    files: &[PathBuf],
    chapters: &[Chapter],
    header: &MetadataHeader,
    output: &Path,
    bitrate: &str,
) -> Result<(), PrepError> {
    let tmpdir = tempfile::Builder::new()
        .prefix("audiobook_prepper_")
        .tempdir_in(&encoder.scratch_root)?;
    let manifest_path = tmpdir.path().join("files.txt");
    let metadata_path = tmpdir.path().join("metadata.txt");

    fs::write(&manifest_path, render_manifest(files)?)?;
    fs::write(&metadata_path, render_metadata(header, chapters))?;
    debug!("Wrote manifest and metadata to {}", tmpdir.path().display());

    let args = build_concat_args(&manifest_path, &metadata_path, output, bitrate)?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_encoder(encoder.program, &args, encoder.debug)?;
    Ok(())
}
