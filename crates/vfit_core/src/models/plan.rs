//! Planner output types.

use serde::{Deserialize, Serialize};

/// Video/audio split of a total bitrate budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitratePlan {
    /// Video bit rate in bits/second.
    pub video_bitrate: u64,
    /// Audio bit rate in bits/second.
    pub audio_bitrate: u64,
}

impl BitratePlan {
    /// Sum of both bit rates; equals the budget the plan was split from.
    pub fn total(&self) -> u64 {
        self.video_bitrate + self.audio_bitrate
    }
}

impl std::fmt::Display for BitratePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "video {}bps, audio {}bps",
            self.video_bitrate, self.audio_bitrate
        )
    }
}

/// One highlight clip to cut from the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Zero-based clip index.
    pub index: usize,
    /// Seek position in the source, seconds (>= 0).
    pub start_time: f64,
    /// Clip length in seconds.
    pub duration: f64,
    /// Bit rates for this clip.
    pub plan: BitratePlan,
}

impl ClipSpec {
    /// One-based clip number used in file names and messages.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}
