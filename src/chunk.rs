//! # Chunk Planner
//!
//! Derives a segment duration that yields chunks of roughly `target_chunk_mb`:
//!
//! 1. Effective bitrate: container bitrate if present, else `size * 8 / duration`
//! 2. `segment_seconds = target_chunk_mb * 1024 * 1024 * 8 / bitrate`
//! 3. Clamp to the supplied `min_seconds` / `max_seconds`, then floor at 1 second
//!
//! No I/O happens here; the plan is handed to [`crate::segment`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VideoToolsError};
use crate::probe::MediaMetadata;
use crate::utils::format_size;

/// Absolute lower bound on a segment, regardless of configuration
pub const MIN_SEGMENT_SECONDS: f64 = 1.0;

/// Optional clamp for the computed segment duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub min_seconds: Option<f64>,
    pub max_seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub segment_seconds: f64,
    /// Bitrate the plan was derived from
    pub effective_bitrate_bps: f64,
}

pub fn plan(metadata: &MediaMetadata, target_chunk_mb: f64, bounds: SegmentBounds) -> Result<ChunkPlan> {
    if !(target_chunk_mb.is_finite() && target_chunk_mb > 0.0) {
        return Err(VideoToolsError::InvalidTarget(format!(
            "--target-mb must be > 0 (got {})",
            target_chunk_mb
        )));
    }
    if !(metadata.duration_seconds.is_finite() && metadata.duration_seconds > 0.0) {
        return Err(VideoToolsError::InvalidTarget(format!(
            "duration must be > 0 (got {})",
            metadata.duration_seconds
        )));
    }

    let effective_bitrate_bps = metadata.effective_bitrate_bps();
    let mut segment_seconds = if effective_bitrate_bps > 0.0 {
        target_chunk_mb * 1024.0 * 1024.0 * 8.0 / effective_bitrate_bps
    } else {
        // empty file, one chunk holds everything
        metadata.duration_seconds
    };

    // min first, then max: a max below min wins
    if let Some(min) = bounds.min_seconds {
        segment_seconds = segment_seconds.max(min);
    }
    if let Some(max) = bounds.max_seconds {
        segment_seconds = segment_seconds.min(max);
    }
    segment_seconds = segment_seconds.max(MIN_SEGMENT_SECONDS);

    info!("--- chunk-size plan ---");
    info!("duration: {:.3}s", metadata.duration_seconds);
    info!("size: {}", format_size(metadata.size_bytes));
    info!("bitrate: {:.1} kbps", effective_bitrate_bps / 1000.0);
    info!("target: {}MB", target_chunk_mb);
    info!("segment_time: {:.3}s", segment_seconds);

    Ok(ChunkPlan {
        segment_seconds,
        effective_bitrate_bps,
    })
}
