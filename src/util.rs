use std::path::Path;

use crate::error::PrepError;

/// Helper to convert a Path to &str for ffmpeg arguments, returning an error if not valid UTF-8.
pub fn path_to_str(path: &Path) -> Result<&str, PrepError> {
    path.to_str()
        .ok_or_else(|| PrepError::NonUtf8Path(path.to_path_buf()))
}

/// Render milliseconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
