//! Settings struct with TOML-based sections.
//!
//! Every policy constant used by the planner, the probe, and the encoder
//! lives here with a documented default, so runs can be tuned from a config
//! file without touching code.

use serde::{Deserialize, Serialize};

use super::manager::{ConfigError, ConfigResult};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Bitrate planning policy.
    #[serde(default)]
    pub planner: PlannerSettings,

    /// Highlight clip fallback.
    #[serde(default)]
    pub clips: ClipSettings,

    /// Defaults substituted for missing probe fields.
    #[serde(default)]
    pub probe: ProbeSettings,

    /// External encoder invocation.
    #[serde(default)]
    pub encoder: EncoderSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Check values the planner and clip fallback cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.planner.audio_share_divisor == 0 {
            return Err(ConfigError::Invalid(
                "planner.audio_share_divisor must be at least 1".into(),
            ));
        }

        if !(self.planner.size_tolerance.is_finite() && self.planner.size_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "planner.size_tolerance must be positive, got {}",
                self.planner.size_tolerance
            )));
        }

        if self.clips.count == 0 {
            return Err(ConfigError::Invalid(
                "clips.count must be at least 1".into(),
            ));
        }

        if !(self.clips.max_duration_secs.is_finite() && self.clips.max_duration_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "clips.max_duration_secs must be positive, got {}",
                self.clips.max_duration_secs
            )));
        }

        Ok(())
    }
}

/// Bitrate planning policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Upper bound for the audio bit rate (bits/second).
    #[serde(default = "default_max_audio_bitrate")]
    pub max_audio_bitrate: u64,

    /// Audio gets at most `total / audio_share_divisor`.
    #[serde(default = "default_audio_share_divisor")]
    pub audio_share_divisor: u64,

    /// Quality floor: full compression is rejected below this video bit rate.
    #[serde(default = "default_min_video_bitrate")]
    pub min_video_bitrate: u64,

    /// Accepted output size as a multiple of the target size.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,
}

fn default_max_audio_bitrate() -> u64 {
    128_000
}

fn default_audio_share_divisor() -> u64 {
    10
}

fn default_min_video_bitrate() -> u64 {
    200_000
}

fn default_size_tolerance() -> f64 {
    1.1
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_audio_bitrate: default_max_audio_bitrate(),
            audio_share_divisor: default_audio_share_divisor(),
            min_video_bitrate: default_min_video_bitrate(),
            size_tolerance: default_size_tolerance(),
        }
    }
}

/// Highlight clip fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSettings {
    /// Number of clips to cut.
    #[serde(default = "default_clip_count")]
    pub count: usize,

    /// Longest clip in seconds.
    #[serde(default = "default_max_clip_duration")]
    pub max_duration_secs: f64,

    /// File name prefix; clips are named `<prefix>_<n>.<ext>`.
    #[serde(default = "default_clip_prefix")]
    pub name_prefix: String,
}

fn default_clip_count() -> usize {
    3
}

fn default_max_clip_duration() -> f64 {
    30.0
}

fn default_clip_prefix() -> String {
    "highlight_clip".to_string()
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            count: default_clip_count(),
            max_duration_secs: default_max_clip_duration(),
            name_prefix: default_clip_prefix(),
        }
    }
}

/// Values used when the probe does not report a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Audio bit rate assumed when there is no audio stream or no bit rate.
    #[serde(default = "default_audio_bitrate")]
    pub default_audio_bitrate: u64,

    /// Width assumed when there is no video stream or no width.
    #[serde(default = "default_width")]
    pub default_width: u32,

    /// Height assumed when there is no video stream or no height.
    #[serde(default = "default_height")]
    pub default_height: u32,
}

fn default_audio_bitrate() -> u64 {
    128_000
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            default_audio_bitrate: default_audio_bitrate(),
            default_width: default_width(),
            default_height: default_height(),
        }
    }
}

/// External encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// FFmpeg executable.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// FFprobe executable.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Video codec passed to `-c:v`.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec passed to `-c:a`.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder speed/quality preset.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Extension (and container) of produced files.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Keep a compressed file that missed the size tolerance.
    #[serde(default)]
    pub keep_oversized_output: bool,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_output_extension() -> String {
    "mp4".to_string()
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            output_extension: default_output_extension(),
            keep_oversized_output: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Only keep encoder output in the tail buffer instead of echoing it.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of encoder output lines shown after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix console lines with a timestamp.
    #[serde(default)]
    pub show_timestamps: bool,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: false,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Names of config sections, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Planner,
    Clips,
    Probe,
    Encoder,
    Logging,
}

impl ConfigSection {
    /// All sections in the order they are written.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Planner,
        ConfigSection::Clips,
        ConfigSection::Probe,
        ConfigSection::Encoder,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Planner => "planner",
            ConfigSection::Clips => "clips",
            ConfigSection::Probe => "probe",
            ConfigSection::Encoder => "encoder",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Planner => "Bitrate planning policy",
            ConfigSection::Clips => "Highlight clip fallback",
            ConfigSection::Probe => "Defaults for fields the probe does not report",
            ConfigSection::Encoder => "External encoder (FFmpeg) invocation",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[planner]"));
        assert!(toml.contains("[encoder]"));
        assert!(toml.contains("min_video_bitrate"));
    }

    #[test]
    fn defaults_match_policy() {
        let settings = Settings::default();
        assert_eq!(settings.planner.max_audio_bitrate, 128_000);
        assert_eq!(settings.planner.audio_share_divisor, 10);
        assert_eq!(settings.planner.min_video_bitrate, 200_000);
        assert_eq!(settings.planner.size_tolerance, 1.1);
        assert_eq!(settings.clips.count, 3);
        assert_eq!(settings.clips.max_duration_secs, 30.0);
        assert_eq!(settings.encoder.video_codec, "libx264");
        assert_eq!(settings.encoder.audio_codec, "aac");
        assert_eq!(settings.encoder.preset, "medium");
        assert!(!settings.encoder.keep_oversized_output);
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.clips.name_prefix, settings.clips.name_prefix);
        assert_eq!(parsed.logging.compact, settings.logging.compact);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[planner]\nmin_video_bitrate = 300000";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.planner.min_video_bitrate, 300_000);
        // Defaults applied for missing
        assert_eq!(parsed.planner.max_audio_bitrate, 128_000);
        assert_eq!(parsed.clips.count, 3);
        assert_eq!(parsed.encoder.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let cases: [(&str, fn(&mut Settings)); 6] = [
            ("audio_share_divisor", |s: &mut Settings| s.planner.audio_share_divisor = 0),
            ("size_tolerance", |s: &mut Settings| s.planner.size_tolerance = 0.0),
            ("size_tolerance", |s: &mut Settings| s.planner.size_tolerance = -1.1),
            ("size_tolerance", |s: &mut Settings| s.planner.size_tolerance = f64::NAN),
            ("clips.count", |s: &mut Settings| s.clips.count = 0),
            ("max_duration_secs", |s: &mut Settings| s.clips.max_duration_secs = 0.0),
        ];

        for (field, mutate) in cases {
            let mut settings = Settings::default();
            mutate(&mut settings);
            match settings.validate() {
                Err(ConfigError::Invalid(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("{} accepted: {:?}", field, other),
            }
        }
    }

    #[test]
    fn section_names_are_unique() {
        let mut names: Vec<_> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigSection::ALL.len());
    }
}
