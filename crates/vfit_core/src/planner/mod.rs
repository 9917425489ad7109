//! Bitrate planning.
//!
//! Turns a size budget into encoder bit rates:
//!
//! ```text
//! total_bits    = target_mb * 1024 * 1024 * 8
//! total_bitrate = total_bits / duration          (bits/s, truncated)
//! audio         = min(max_audio, total / 10)
//! video         = total - audio                  (rejected below the quality floor)
//! ```
//!
//! Clips split the same budget evenly and are placed at the centers of
//! `num_clips + 1` equal slots across the source.

mod bitrate;
mod clips;

pub use bitrate::{plan_full_compression, split_bitrate, total_bitrate, within_size_budget};
pub use clips::{plan_clip, plan_clips};

use thiserror::Error;

/// Bytes per megabyte used for size budgets (MiB).
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Errors from the bitrate planner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// An argument was outside its valid range.
    #[error("Invalid planning input: {0}")]
    InvalidInput(String),

    /// The video bit rate would fall below the quality floor.
    #[error("Target video bitrate ({video_bitrate}bps) is below the quality floor ({floor}bps)")]
    Rejected { video_bitrate: u64, floor: u64 },
}

impl PlanError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for planner operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Reject non-finite or non-positive values.
fn require_positive(what: &str, value: f64) -> PlanResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanError::invalid_input(format!(
            "{} must be positive, got {}",
            what, value
        )))
    }
}
