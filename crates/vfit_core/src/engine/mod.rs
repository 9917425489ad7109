//! External media engine.
//!
//! The orchestrator never runs tools directly; it talks to a
//! [`MediaEngine`]. [`FfmpegEngine`] is the production implementation
//! (ffprobe + ffmpeg subprocesses); tests substitute an in-memory engine.
//!
//! ```text
//! probe(path)        → ProbeData { duration, streams }
//! encode(&request)   → Ok(()) | EngineError
//!   first pass       → video only, output discarded, writes pass log
//!   second pass      → video + audio, reads pass log
//!   clip             → single pass over a seeked segment
//! ```

mod errors;
mod ffmpeg;
mod ffprobe;
mod passlog;

pub use errors::{EngineError, EngineResult};
pub use ffmpeg::{build_ffmpeg_args, FfmpegEngine};
pub use ffprobe::parse_probe_json;
pub use passlog::PassLog;

use std::path::{Path, PathBuf};

use crate::models::{BitratePlan, ClipSpec, ProbeData};

/// Operations the orchestrator needs from the media engine.
///
/// Calls block until the engine finishes.
pub trait MediaEngine {
    /// Read duration and stream information from a media file.
    fn probe(&self, path: &Path) -> EngineResult<ProbeData>;

    /// Run one encode.
    fn encode(&self, request: &EncodeRequest) -> EngineResult<()>;
}

impl<E: MediaEngine + ?Sized> MediaEngine for &E {
    fn probe(&self, path: &Path) -> EngineResult<ProbeData> {
        (**self).probe(path)
    }

    fn encode(&self, request: &EncodeRequest) -> EngineResult<()> {
        (**self).encode(request)
    }
}

/// Where encoded data goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeTarget {
    /// Write a file.
    File(PathBuf),
    /// Throw the output away (analysis pass).
    Discard,
}

/// Pass number and statistics location of a two-pass encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSpec {
    /// 1 or 2.
    pub number: u8,
    /// Value for `-passlogfile`.
    pub log_prefix: PathBuf,
}

/// Portion of the input to encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Seek position in seconds.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
}

/// Parameters of a single encoder invocation.
///
/// Codecs and preset are engine policy and are not part of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    /// Source file.
    pub input: PathBuf,
    /// Destination.
    pub target: EncodeTarget,
    /// Video bit rate in bits/second.
    pub video_bitrate: u64,
    /// Audio bit rate in bits/second; `None` disables audio.
    pub audio_bitrate: Option<u64>,
    /// Two-pass information, if this is one of the passes.
    pub pass: Option<PassSpec>,
    /// Segment to cut, if not the whole input.
    pub segment: Option<Segment>,
}

impl EncodeRequest {
    /// Analysis pass: video only, output discarded, statistics to `passlog`.
    pub fn first_pass(input: &Path, plan: &BitratePlan, passlog: &PassLog) -> Self {
        Self {
            input: input.to_path_buf(),
            target: EncodeTarget::Discard,
            video_bitrate: plan.video_bitrate,
            audio_bitrate: None,
            pass: Some(PassSpec {
                number: 1,
                log_prefix: passlog.prefix().to_path_buf(),
            }),
            segment: None,
        }
    }

    /// Final pass: reads `passlog`, writes `output` with audio.
    pub fn second_pass(
        input: &Path,
        output: &Path,
        plan: &BitratePlan,
        passlog: &PassLog,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            target: EncodeTarget::File(output.to_path_buf()),
            video_bitrate: plan.video_bitrate,
            audio_bitrate: Some(plan.audio_bitrate),
            pass: Some(PassSpec {
                number: 2,
                log_prefix: passlog.prefix().to_path_buf(),
            }),
            segment: None,
        }
    }

    /// Single-pass encode of one highlight clip.
    pub fn clip(input: &Path, output: &Path, clip: &ClipSpec) -> Self {
        Self {
            input: input.to_path_buf(),
            target: EncodeTarget::File(output.to_path_buf()),
            video_bitrate: clip.plan.video_bitrate,
            audio_bitrate: Some(clip.plan.audio_bitrate),
            pass: None,
            segment: Some(Segment {
                start: clip.start_time,
                duration: clip.duration,
            }),
        }
    }

    /// Output file, if the request writes one.
    pub fn output_path(&self) -> Option<&Path> {
        match &self.target {
            EncodeTarget::File(path) => Some(path),
            EncodeTarget::Discard => None,
        }
    }
}

impl std::fmt::Display for EncodeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "encode {}", self.input.display())?;
        if let Some(segment) = &self.segment {
            write!(f, " [{:.1}s +{:.1}s]", segment.start, segment.duration)?;
        }
        if let Some(pass) = &self.pass {
            write!(f, " pass {}", pass.number)?;
        }
        write!(f, " video {}bps", self.video_bitrate)?;
        match self.audio_bitrate {
            Some(rate) => write!(f, " audio {}bps", rate)?,
            None => write!(f, " no audio")?,
        }
        match &self.target {
            EncodeTarget::File(path) => write!(f, " -> {}", path.display()),
            EncodeTarget::Discard => write!(f, " -> (discarded)"),
        }
    }
}
