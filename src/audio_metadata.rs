use std::path::Path;

use tracing::debug;

use crate::error::PrepError;
use crate::ffmpeg::run_ffprobe;
use crate::util::path_to_str;

/// Duration and bitrate of the first audio stream in a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    /// Seconds, stream duration if known, else container duration.
    pub duration: Option<f64>,
    /// Bits per second, stream bitrate if known, else container bitrate.
    pub bit_rate: Option<u64>,
}

impl AudioInfo {
    /// Duration truncated to whole milliseconds.
    pub fn duration_ms(&self, path: &Path) -> Result<u64, PrepError> {
        match self.duration {
            Some(secs) if secs.is_finite() && secs >= 0.0 => Ok((secs * 1000.0) as u64),
            Some(secs) => Err(PrepError::Probe {
                path: path.to_path_buf(),
                reason: format!("invalid duration {}", secs),
            }),
            None => Err(PrepError::Probe {
                path: path.to_path_buf(),
                reason: "could not determine duration".to_string(),
            }),
        }
    }

    pub fn bit_rate(&self, path: &Path) -> Result<u64, PrepError> {
        self.bit_rate
            .filter(|br| *br > 0)
            .ok_or_else(|| PrepError::Probe {
                path: path.to_path_buf(),
                reason: "could not determine bitrate".to_string(),
            })
    }
}

/// Ask ffprobe for the first audio stream's duration and bitrate.
pub fn probe_audio(path: &Path, debug: bool) -> Result<AudioInfo, PrepError> {
    let path_str = path_to_str(path)?;
    let stdout = run_ffprobe(
        &[
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=duration,bit_rate:format=duration,bit_rate",
            "-of",
            "json",
            path_str,
        ],
        debug,
    )?;
    let info = parse_probe_output(&stdout).map_err(|e| PrepError::Probe {
        path: path.to_path_buf(),
        reason: format!("unreadable ffprobe output: {}", e),
    })?;
    debug!("Probed {}: {:?}", path.display(), info);
    Ok(info)
}

fn number_field<T: std::str::FromStr>(value: &serde_json::Value) -> Option<T> {
    // ffprobe prints numbers as JSON strings
    value.as_str().and_then(|s| s.trim().parse().ok())
}

pub fn parse_probe_output(stdout: &[u8]) -> Result<AudioInfo, serde_json::Error> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;
    let stream = json["streams"].as_array().and_then(|streams| streams.first());

    let duration = stream
        .and_then(|s| number_field::<f64>(&s["duration"]))
        .or_else(|| number_field(&json["format"]["duration"]));
    let bit_rate = stream
        .and_then(|s| number_field::<u64>(&s["bit_rate"]))
        .or_else(|| number_field(&json["format"]["bit_rate"]));

    Ok(AudioInfo { duration, bit_rate })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_stream_values() {
        let out = br#"{
            "programs": [],
            "streams": [ { "duration": "1.044898", "bit_rate": "128000" } ],
            "format": { "duration": "1.071000", "bit_rate": "129512" }
        }"#;
        let info = parse_probe_output(out).unwrap();
        assert_eq!(info.duration, Some(1.044898));
        assert_eq!(info.bit_rate, Some(128000));
        assert_eq!(info.duration_ms(Path::new("a.mp3")).unwrap(), 1044);
    }

    #[test]
    fn falls_back_to_container_values() {
        let out = br#"{
            "streams": [ { } ],
            "format": { "duration": "2.500000", "bit_rate": "64000" }
        }"#;
        let info = parse_probe_output(out).unwrap();
        assert_eq!(info.duration_ms(Path::new("a.mp3")).unwrap(), 2500);
        assert_eq!(info.bit_rate(Path::new("a.mp3")).unwrap(), 64000);
    }

    #[test]
    fn missing_values_are_probe_errors() {
        let info = parse_probe_output(br#"{ "streams": [], "format": {} }"#).unwrap();
        assert!(matches!(
            info.duration_ms(Path::new("a.mp3")),
            Err(PrepError::Probe { .. })
        ));
        assert!(matches!(
            info.bit_rate(Path::new("a.mp3")),
            Err(PrepError::Probe { .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_probe_output(b"not json").is_err());
    }
}
