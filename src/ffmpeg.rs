//! # FFmpeg Toolkit
//!
//! Real [`MediaToolkit`] backed by the `ffprobe` and `ffmpeg` binaries.
//!
//! ## Probe:
//! - One read-only `ffprobe` query per field (`format=duration`, `format=bit_rate`)
//! - File size comes from filesystem metadata, not from ffprobe
//! - Duration is mandatory, bitrate is optional
//!
//! ## Execute:
//! - Spawns `ffmpeg` with inherited stdio and waits for it
//! - No timeout: a hung ffmpeg hangs the invocation

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{Result, VideoToolsError};
use crate::probe::{parse_bitrate_output, parse_duration_output, MediaMetadata};
use crate::tool_resolver::{is_bare_name, missing_dependency, ToolPathResolver};
use crate::toolkit::MediaToolkit;
use crate::utils::{path_arg, shell_quote};

pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegToolkit {
    pub fn new(resolver: &ToolPathResolver) -> Self {
        Self {
            ffmpeg: resolver.command_for("ffmpeg"),
            ffprobe: resolver.command_for("ffprobe"),
        }
    }

    /// Runs `ffprobe -show_entries format=<entry>`; returns success and stdout.
    async fn query_format_entry(&self, path: &Path, entry: &str) -> Result<(bool, String)> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                &format!("format={}", entry),
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(&self.ffprobe, "ffprobe", e))?;

        if !output.status.success() {
            debug!(
                "ffprobe {} failed for {}: {}",
                entry,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }
}

impl MediaToolkit for FfmpegToolkit {
    async fn probe(&self, path: &Path) -> Result<MediaMetadata> {
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(VideoToolsError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let (ok, duration_out) = self.query_format_entry(path, "duration").await?;
        if !ok {
            return Err(VideoToolsError::ProbeError {
                path: path.to_path_buf(),
                reason: "ffprobe could not read the container".to_string(),
            });
        }
        let duration_seconds = parse_duration_output(path, &duration_out)?;

        let bitrate_bps = match self.query_format_entry(path, "bit_rate").await? {
            (true, out) => parse_bitrate_output(&out),
            (false, _) => None,
        };
        if bitrate_bps.is_none() {
            warn!("No container bitrate for {}, will derive it from size", path.display());
        }

        MediaMetadata::new(path, duration_seconds, size_bytes, bitrate_bps)
    }

    async fn execute(&self, args: &[String]) -> Result<i32> {
        let command_line = std::iter::once(path_arg(&self.ffmpeg))
            .chain(args.iter().cloned())
            .map(|a| shell_quote(&a))
            .collect::<Vec<_>>()
            .join(" ");
        info!("$ {}", command_line);

        let start_time = std::time::Instant::now();
        let status = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| spawn_error(&self.ffmpeg, "ffmpeg", e))?;

        debug!("ffmpeg finished in {:.1}s with {}", start_time.elapsed().as_secs_f64(), status);
        Ok(status.code().unwrap_or(-1))
    }
}

fn spawn_error(command: &Path, tool: &str, err: std::io::Error) -> VideoToolsError {
    if err.kind() == ErrorKind::NotFound && is_bare_name(command) {
        missing_dependency(tool)
    } else {
        VideoToolsError::Io(err)
    }
}
