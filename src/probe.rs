//! # Media Metadata
//!
//! `MediaMetadata` is the immutable snapshot a probe produces and the planners
//! consume. This module also parses the textual `ffprobe` answers for the two
//! queried fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VideoToolsError};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Probed properties of one media file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub duration_seconds: f64,
    pub size_bytes: u64,
    /// Container-reported average bitrate, when present
    pub bitrate_bps: Option<u64>,
}

impl MediaMetadata {
    /// Builds a snapshot, rejecting a missing or non-positive duration.
    pub fn new(path: &Path, duration_seconds: f64, size_bytes: u64, bitrate_bps: Option<u64>) -> Result<Self> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(VideoToolsError::ProbeError {
                path: path.to_path_buf(),
                reason: format!("non-positive duration {}", duration_seconds),
            });
        }

        Ok(Self {
            duration_seconds,
            size_bytes,
            bitrate_bps: bitrate_bps.filter(|&b| b > 0),
        })
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }

    /// Container bitrate when usable, otherwise the size/duration average.
    pub fn effective_bitrate_bps(&self) -> f64 {
        match self.bitrate_bps {
            Some(bps) if bps > 0 => bps as f64,
            _ => self.size_bytes as f64 * 8.0 / self.duration_seconds,
        }
    }
}

/// Parses the `format=duration` answer. Duration is mandatory.
pub fn parse_duration_output(path: &Path, output: &str) -> Result<f64> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(VideoToolsError::ProbeError {
            path: path.to_path_buf(),
            reason: "ffprobe reported no duration".to_string(),
        });
    }

    trimmed.parse::<f64>().map_err(|_| VideoToolsError::ProbeError {
        path: path.to_path_buf(),
        reason: format!("unparsable duration '{}'", trimmed),
    })
}

/// Parses the `format=bit_rate` answer; missing or garbage values mean "absent".
pub fn parse_bitrate_output(output: &str) -> Option<u64> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|bps| bps.is_finite() && *bps >= 1.0)
        .map(|bps| bps.trunc() as u64)
}
