//! Stream handling modes and re-encode profiles.
//!
//! Copy mode re-muxes the source bit-for-bit, so cut points snap to the nearest
//! keyframe. Re-encode mode runs a full decode/encode pass with an
//! [`EncodeProfile`] and lands exactly on the requested boundaries.

use serde::{Deserialize, Serialize};

use crate::args;

/// Copy-through or uniform re-encode, chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    Copy,
    Reencode,
}

impl StreamMode {
    pub fn from_copy_flag(copy: bool) -> Self {
        if copy {
            Self::Copy
        } else {
            Self::Reencode
        }
    }

    /// Codec arguments for this mode; `profile` is only used when re-encoding.
    pub fn args(self, profile: &EncodeProfile) -> Vec<String> {
        match self {
            Self::Copy => args!["-c", "copy"],
            Self::Reencode => profile.to_args(),
        }
    }
}

/// Fixed fallback quality profile for re-encode mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeProfile {
    pub video_codec: String,
    pub preset: String,
    /// Constant rate factor (0-51, lower = better quality)
    pub crf: u8,
    pub audio_codec: String,
    pub audio_kbps: u32,
}

impl EncodeProfile {
    /// Profile used when segmenting without stream copy
    pub fn segment_default() -> Self {
        Self {
            preset: "veryfast".to_string(),
            ..Self::concat_default()
        }
    }

    /// Profile used when concatenating without stream copy
    pub fn concat_default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_kbps: 128,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        args![
            "-c:v",
            self.video_codec,
            "-preset",
            self.preset,
            "-crf",
            self.crf,
            "-c:a",
            self.audio_codec,
            "-b:a",
            format!("{}k", self.audio_kbps),
        ]
    }
}
