//! Error types for a compression run.
//!
//! Fatal kinds end the run. The others send it to the clip fallback
//! (or, for single clips, are recorded and skipped).

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;
use crate::planner::PlanError;

/// Failure during a compression run.
#[derive(Error, Debug)]
pub enum CompressError {
    /// The input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Probing failed or returned no usable duration.
    #[error("Failed to probe {}: {reason}", .path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    /// Request parameters were out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The planned video bit rate is below the quality floor.
    #[error("Planning rejected: {0}")]
    PlanningRejected(#[source] PlanError),

    /// One of the two encoding passes failed.
    #[error("Pass {pass} failed: {source}")]
    PassFailed {
        pass: u8,
        #[source]
        source: EngineError,
    },

    /// The compressed file is larger than the tolerated size.
    #[error("Output is {actual_mb:.2} MB, limit is {limit_mb:.2} MB")]
    OutputTooLarge { actual_mb: f64, limit_mb: f64 },

    /// A single highlight clip failed.
    #[error("Clip {clip} failed: {source}")]
    ClipFailed {
        clip: usize,
        #[source]
        source: EngineError,
    },

    /// The fallback finished without producing any clip.
    #[error("No clips were produced ({attempted} attempted)")]
    NoClipsProduced { attempted: usize },
}

impl CompressError {
    /// Create a probe failed error.
    pub fn probe_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether this error ends the run instead of triggering the clip fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound(_)
                | Self::ProbeFailed { .. }
                | Self::InvalidInput(_)
                | Self::NoClipsProduced { .. }
        )
    }
}

impl From<PlanError> for CompressError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidInput(message) => Self::InvalidInput(message),
            rejected @ PlanError::Rejected { .. } => Self::PlanningRejected(rejected),
        }
    }
}

/// Result type for compression runs.
pub type CompressResult<T> = Result<T, CompressError>;
