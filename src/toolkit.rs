//! # Media Toolkit Interface
//!
//! The narrow seam between the planners/executors and the external encoding
//! toolchain. Only two capabilities cross it: `probe` a file and `execute` an
//! argument vector. [`crate::ffmpeg::FfmpegToolkit`] is the real implementation;
//! tests swap in a fake that returns fixed metadata and records invocations.

use std::path::Path;

use crate::error::{Result, VideoToolsError};
use crate::probe::MediaMetadata;

/// Probe/execute capabilities of the external toolchain
#[allow(async_fn_in_trait)]
pub trait MediaToolkit {
    /// Queries duration, size and optional container bitrate of `path`.
    async fn probe(&self, path: &Path) -> Result<MediaMetadata>;

    /// Runs the transcoder with `args` (program name excluded) and returns its
    /// exit status. Only a failure to launch is an `Err`.
    async fn execute(&self, args: &[String]) -> Result<i32>;

    /// Name used in diagnostics for `execute` failures
    fn tool_name(&self) -> &str {
        "ffmpeg"
    }
}

/// Maps a non-zero exit status to `ExternalToolError`.
pub fn ensure_success(tool: &str, status: i32) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(VideoToolsError::ExternalToolError {
            tool: tool.to_string(),
            status,
        })
    }
}
