//! # Bitrate Planner
//!
//! Turns a probed duration and a target output size into an encode plan.
//!
//! ## Judgment:
//! - **Innocent**: the source is already under `target_size_mb * innocence_threshold_ratio`.
//!   It gets a constant-quality (CRF) encode and no bitrate enforcement, so the
//!   output size is whatever the quality setting yields.
//! - **Wicked**: the source is over budget. The video stream gets an explicit
//!   bitrate, `target_total_kbps - audio_kbps`, clamped to
//!   `[min_video_kbps, max_video_kbps]`.
//!
//! The planner is pure: same metadata and policy, same plan.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VideoToolsError};
use crate::probe::MediaMetadata;

/// Size/bitrate policy for the compression planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitratePolicy {
    /// Target output size in MB
    pub target_size_mb: f64,
    /// Fixed audio bitrate in kbps
    pub audio_kbps: u32,
    /// Video bitrate floor (protects intelligibility)
    pub min_video_kbps: u32,
    /// Video bitrate ceiling (short or tiny inputs)
    pub max_video_kbps: u32,
    /// Sources under `target_size_mb * ratio` are innocent
    pub innocence_threshold_ratio: f64,
    /// CRF used for innocent sources
    pub quality_crf: u8,
    pub preset: String,
    /// Downscale anything wider than this
    pub max_width: u32,
}

impl Default for BitratePolicy {
    fn default() -> Self {
        Self {
            target_size_mb: 250.0,
            audio_kbps: 96,
            min_video_kbps: 150,
            max_video_kbps: 5000,
            innocence_threshold_ratio: 1.2,
            quality_crf: 23,
            preset: "medium".to_string(),
            max_width: 1280,
        }
    }
}

impl BitratePolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_size_mb.is_finite() && self.target_size_mb > 0.0) {
            return Err(VideoToolsError::InvalidTarget(format!(
                "target size must be > 0 MB (got {})",
                self.target_size_mb
            )));
        }
        if !(self.innocence_threshold_ratio.is_finite() && self.innocence_threshold_ratio > 0.0) {
            return Err(VideoToolsError::InvalidArguments(
                "innocence threshold ratio must be > 0".to_string(),
            ));
        }
        if self.min_video_kbps > self.max_video_kbps {
            return Err(VideoToolsError::InvalidArguments(format!(
                "min video bitrate {}k exceeds max video bitrate {}k",
                self.min_video_kbps, self.max_video_kbps
            )));
        }
        if self.quality_crf > 51 {
            return Err(VideoToolsError::InvalidArguments(
                "CRF must be between 0 and 51".to_string(),
            ));
        }
        if self.max_width == 0 {
            return Err(VideoToolsError::InvalidArguments(
                "max width must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitrateMode {
    Innocent,
    Wicked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitratePlan {
    pub mode: BitrateMode,
    pub target_total_kbps: u64,
    /// Only set in wicked mode
    pub video_kbps: Option<u64>,
    pub audio_kbps: u64,
    /// Input size, for diagnostics
    pub size_mb: f64,
    /// MB per minute of input
    pub sin_score: f64,
}

/// Total kbps that spreads `target_size_mb` over `duration_seconds`, floored.
pub fn target_total_kbps(target_size_mb: f64, duration_seconds: f64) -> u64 {
    // `as` saturates, so near-zero durations pin to u64::MAX
    (target_size_mb * 8.0 * 1024.0 / duration_seconds).floor() as u64
}

/// Judges the source and apportions the bitrate between audio and video.
pub fn plan(metadata: &MediaMetadata, policy: &BitratePolicy) -> Result<BitratePlan> {
    policy.validate()?;
    if !(metadata.duration_seconds.is_finite() && metadata.duration_seconds > 0.0) {
        return Err(VideoToolsError::InvalidTarget(format!(
            "duration must be > 0 (got {})",
            metadata.duration_seconds
        )));
    }

    let total = target_total_kbps(policy.target_size_mb, metadata.duration_seconds);
    let size_mb = metadata.size_mb();
    let audio_kbps = u64::from(policy.audio_kbps);

    let mode = if size_mb < policy.target_size_mb * policy.innocence_threshold_ratio {
        BitrateMode::Innocent
    } else {
        BitrateMode::Wicked
    };

    let video_kbps = match mode {
        BitrateMode::Innocent => None,
        BitrateMode::Wicked => Some(total.saturating_sub(audio_kbps).clamp(
            u64::from(policy.min_video_kbps),
            u64::from(policy.max_video_kbps),
        )),
    };

    let plan = BitratePlan {
        mode,
        target_total_kbps: total,
        video_kbps,
        audio_kbps,
        size_mb,
        sin_score: size_mb / (metadata.duration_seconds / 60.0),
    };

    info!(
        "Input {:.2} MB over {:.1}s ({:.2} MB/min), target {} MB -> {} kbps total",
        plan.size_mb, metadata.duration_seconds, plan.sin_score, policy.target_size_mb, plan.target_total_kbps
    );
    match plan.video_kbps {
        Some(video) => info!("Judgment: wicked, video capped at {} kbps", video),
        None => info!("Judgment: innocent, CRF {} encode", policy.quality_crf),
    }

    Ok(plan)
}
