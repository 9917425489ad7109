//! Media-related data structures (probe output and derived media info).

use serde::{Deserialize, Serialize};

use crate::config::ProbeSettings;

/// Kind of elementary stream reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Other,
}

impl StreamKind {
    /// Parse an ffprobe `codec_type` value.
    pub fn from_codec_type(s: &str) -> Self {
        match s {
            "video" => StreamKind::Video,
            "audio" => StreamKind::Audio,
            "subtitle" => StreamKind::Subtitle,
            "data" => StreamKind::Data,
            _ => StreamKind::Other,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
            StreamKind::Data => write!(f, "data"),
            StreamKind::Other => write!(f, "other"),
        }
    }
}

/// A single stream as reported by the media engine probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Stream kind (video, audio, ...).
    pub kind: StreamKind,
    /// Bit rate in bits/second, if the container reports one.
    #[serde(default)]
    pub bit_rate: Option<u64>,
    /// Frame width (video only).
    #[serde(default)]
    pub width: Option<u32>,
    /// Frame height (video only).
    #[serde(default)]
    pub height: Option<u32>,
}

impl StreamInfo {
    /// Create a stream of the given kind with no properties.
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            bit_rate: None,
            width: None,
            height: None,
        }
    }

    /// Set the bit rate.
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    /// Set the frame dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Raw answer of a probe: container duration plus the stream list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeData {
    /// Container duration in seconds.
    pub duration: Option<f64>,
    /// Streams in container order.
    pub streams: Vec<StreamInfo>,
}

impl ProbeData {
    /// First stream of the given kind.
    pub fn first_stream(&self, kind: StreamKind) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == kind)
    }
}

/// Media properties used for planning.
///
/// Built once per input from [`ProbeData`]; missing fields are replaced by
/// the configured defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds (always > 0).
    pub duration: f64,
    /// Video bit rate in bits/second (0 when unknown).
    pub video_bitrate: u64,
    /// Audio bit rate in bits/second.
    pub audio_bitrate: u64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl MediaInfo {
    /// Derive media info from a probe result.
    ///
    /// Returns `None` when the probe has no usable duration.
    pub fn from_probe(probe: &ProbeData, defaults: &ProbeSettings) -> Option<Self> {
        let duration = probe.duration.filter(|d| d.is_finite() && *d > 0.0)?;

        let video = probe.first_stream(StreamKind::Video);
        let audio = probe.first_stream(StreamKind::Audio);

        Some(Self {
            duration,
            video_bitrate: video.and_then(|v| v.bit_rate).unwrap_or(0),
            audio_bitrate: audio
                .and_then(|a| a.bit_rate)
                .unwrap_or(defaults.default_audio_bitrate),
            width: video
                .and_then(|v| v.width)
                .unwrap_or(defaults.default_width),
            height: video
                .and_then(|v| v.height)
                .unwrap_or(defaults.default_height),
        })
    }

    /// Short human-readable description, e.g. `1920x1080, 600.0s, 2.50 Mb/s video`.
    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("{}x{}", self.width, self.height),
            format!("{:.1}s", self.duration),
        ];
        if self.video_bitrate > 0 {
            parts.push(format!(
                "{:.2} Mb/s video",
                self.video_bitrate as f64 / 1_000_000.0
            ));
        }
        parts.push(format!("{} kb/s audio", self.audio_bitrate / 1000));
        parts.join(", ")
    }
}
