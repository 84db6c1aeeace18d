use std::path::PathBuf;
use thiserror::Error;

use crate::ffmpeg::FFmpegError;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("No input files. Pass one or more paths or glob patterns.")]
    NoFileInput,
    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Unknown tag '{0}'. Use a known name (title, album, artist, ...) or a 4-character ID3v2 frame id.")]
    UnknownTag(String),
    #[error("An error occurred while processing the file: {} - {source}", path.display())]
    TagIo {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },
    #[error("An error occurred while processing the file: {} - missing required '{tag}' tag", path.display())]
    MissingTag { path: PathBuf, tag: &'static str },
    #[error("An error occurred while processing the file: {} - {reason}", path.display())]
    Probe { path: PathBuf, reason: String },
    #[error("Invalid path (not UTF-8): {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error(transparent)]
    Encoder(#[from] FFmpegError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
