//! Configuration management for video-fit.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Documented defaults for every policy constant (bitrate caps, quality
//!   floor, size tolerance, clip layout, encoder codecs and preset)
//! - Atomic file writes (write to temp, then rename)
//!
//! # Example
//!
//! ```no_run
//! use vfit_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new(".config/compress.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Quality floor: {}bps", config.settings().planner.min_video_bitrate);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ClipSettings, ConfigSection, EncoderSettings, LoggingSettings, PlannerSettings, ProbeSettings,
    Settings,
};
