use regex::Regex;
use std::{
    io,
    process::{Command, Stdio},
};
use thiserror::Error;
use tracing::debug;

const MINIMUM_FFMPEG_MAJOR_VERSION: u32 = 4;

#[derive(Debug)]
pub struct FFmpegVersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub is_compatible: bool,
}

#[derive(Debug)]
pub struct FFmpegCheckResult {
    pub ffmpeg_available: bool,
    pub ffmpeg_version: Option<FFmpegVersionInfo>,
    pub ffprobe_available: bool,
    pub aac_encoder_available: bool,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum FFmpegError {
    #[error("`{0}` command not found. Please ensure it is installed and in your PATH.")]
    CommandNotFound(String),
    #[error("Failed to run `{0}`: {1}")]
    CommandFailed(String, String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn spawn_error(program: &str, e: io::Error) -> FFmpegError {
    if e.kind() == io::ErrorKind::NotFound {
        FFmpegError::CommandNotFound(program.to_string())
    } else {
        FFmpegError::Io(e)
    }
}

/// Run an ffmpeg-compatible `program` to completion and check its exit status.
/// Its output is discarded unless `debug` is set.
pub fn run_encoder(program: &str, args: &[&str], debug: bool) -> Result<(), FFmpegError> {
    debug!("{} {}", program, args.join(" "));
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());

    if !debug {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = command.status().map_err(|e| spawn_error(program, e))?;
    if !status.success() {
        return Err(FFmpegError::CommandFailed(
            format!("{} {}", program, args.join(" ")),
            format!("{} exited with {}", program, status),
        ));
    }
    Ok(())
}

/// Run ffprobe and return its stdout.
pub fn run_ffprobe(args: &[&str], debug: bool) -> Result<Vec<u8>, FFmpegError> {
    debug!("ffprobe {}", args.join(" "));
    let output = Command::new("ffprobe")
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error("ffprobe", e))?;

    if debug {
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
    }
    if !output.status.success() {
        return Err(FFmpegError::CommandFailed(
            format!("ffprobe {}", args.join(" ")),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(output.stdout)
}

pub fn check_dependency(cmd: &str) -> Result<(), FFmpegError> {
    match Command::new(cmd)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                Err(FFmpegError::CommandNotFound(cmd.to_string()))
            } else {
                Err(FFmpegError::CommandFailed(cmd.to_string(), e.to_string()))
            }
        }
    }
}

/// Extract `major.minor[.patch]` from `ffmpeg -version` output.
pub fn parse_ffmpeg_version(version_output: &str) -> Option<FFmpegVersionInfo> {
    let re = Regex::new(r"ffmpeg version n?(\d+)\.(\d+)(?:\.(\d+))?").ok()?;
    let caps = re.captures(version_output)?;
    let major: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minor: u32 = caps.get(2)?.as_str().parse().ok()?;
    let patch: u32 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    Some(FFmpegVersionInfo {
        major,
        minor,
        patch,
        is_compatible: major >= MINIMUM_FFMPEG_MAJOR_VERSION,
    })
}

pub fn check_ffmpeg_installation() -> FFmpegCheckResult {
    let mut result = FFmpegCheckResult {
        ffmpeg_available: false,
        ffmpeg_version: None,
        ffprobe_available: false,
        aac_encoder_available: false,
        error: None,
    };

    // Check if ffmpeg is available
    match Command::new("ffmpeg").arg("-version").output() {
        Ok(output) => {
            if output.status.success() {
                result.ffmpeg_available = true;
                result.ffmpeg_version =
                    parse_ffmpeg_version(&String::from_utf8_lossy(&output.stdout));
            }
        }
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                result.error = Some("FFmpeg not found in PATH".to_string());
            } else {
                result.error = Some(format!("Failed to check FFmpeg: {}", e));
            }
        }
    }

    // Check if ffprobe is available
    match Command::new("ffprobe").arg("-version").output() {
        Ok(output) => {
            result.ffprobe_available = output.status.success();
        }
        Err(_) => {
            result.ffprobe_available = false;
        }
    }

    // Combined files are always encoded to AAC
    match Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
    {
        Ok(output) => {
            let encoders = String::from_utf8_lossy(&output.stdout);
            result.aac_encoder_available = encoders
                .lines()
                .any(|line| line.split_whitespace().nth(1) == Some("aac"));
        }
        Err(_) => {
            result.aac_encoder_available = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_version() {
        let info = parse_ffmpeg_version(
            "ffmpeg version 7.1.1 Copyright (c) 2000-2025 the FFmpeg developers",
        )
        .unwrap();
        assert_eq!((info.major, info.minor, info.patch), (7, 1, 1));
        assert!(info.is_compatible);
    }

    #[test]
    fn parses_version_without_patch() {
        let info = parse_ffmpeg_version("ffmpeg version 3.4 Copyright").unwrap();
        assert_eq!((info.major, info.minor, info.patch), (3, 4, 0));
        assert!(!info.is_compatible);
    }

    #[test]
    fn parses_prefixed_build_version() {
        let info = parse_ffmpeg_version("ffmpeg version n6.0.1 Copyright").unwrap();
        assert_eq!(info.major, 6);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_command_failed() {
        let err = run_encoder("false", &["-y"], false).unwrap_err();
        assert!(matches!(err, FFmpegError::CommandFailed(ref cmd, _) if cmd == "false -y"));
    }

    #[test]
    fn missing_program_is_command_not_found() {
        let err = run_encoder("audiobook-prepper-no-such-encoder", &[], false).unwrap_err();
        assert!(matches!(err, FFmpegError::CommandNotFound(ref name)
            if name == "audiobook-prepper-no-such-encoder"));
    }

    #[test]
    fn git_builds_have_no_version() {
        assert!(parse_ffmpeg_version("ffmpeg version N-112233-gabcdef Copyright").is_none());
    }
}
