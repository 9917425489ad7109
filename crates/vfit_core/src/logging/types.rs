//! Logging types and configuration.

use serde::{Deserialize, Serialize};

use crate::config::LoggingSettings;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

impl LogLevel {
    /// Map a `-v` count to a level: 0 → Info, 1 → Debug, 2+ → Trace.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Configuration for per-run logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Keep encoder output lines in the tail buffer only.
    pub compact: bool,
    /// Number of encoder output lines kept for the tail.
    pub error_tail: usize,
    /// Show timestamps in log output.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: 20,
            show_timestamps: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` config section.
    pub fn from_settings(settings: &LoggingSettings, level: LogLevel) -> Self {
        Self {
            level,
            compact: settings.compact,
            error_tail: settings.error_tail as usize,
            show_timestamps: settings.show_timestamps,
        }
    }
}

/// Callback receiving every formatted log line (the CLI prints them).
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message prefix types for consistent formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Shell command: `$ command`
    Command,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Section marker: `--- Section ---`
    Section,
    /// Success: `[SUCCESS]`
    Success,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Section => format!("--- {} ---", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_format() {
        assert_eq!(MessagePrefix::Phase.format("Pass 1"), "=== Pass 1 ===");
        assert_eq!(MessagePrefix::Command.format("ffmpeg -y"), "$ ffmpeg -y");
        assert_eq!(MessagePrefix::None.format("plain"), "plain");
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(7), LogLevel::Trace);
    }

    #[test]
    fn config_from_settings() {
        let mut settings = LoggingSettings::default();
        settings.error_tail = 7;
        settings.compact = false;

        let config = LogConfig::from_settings(&settings, LogLevel::Debug);
        assert_eq!(config.error_tail, 7);
        assert!(!config.compact);
        assert_eq!(config.level, LogLevel::Debug);
    }
}
