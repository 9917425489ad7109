//! Config manager for loading and saving settings.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Validation on load (unknown sections are dropped on re-save)
//! - Missing keys are filled with defaults and written back

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages application configuration.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Changes stay in memory until `save()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager and return the loaded settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist or holds invalid values.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also validates and cleans up the config, saving if changes were made.
    /// A file with invalid values is left untouched.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = parse_validate_and_clean(&content)?;
            settings.validate()?;
            self.settings = settings;

            if was_modified {
                tracing::debug!(
                    "Config {} had unknown or missing keys, rewriting",
                    self.config_path.display()
                );
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = generate_config_with_comments(&self.settings)?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Temp file in the same directory so the rename stays on one filesystem
        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Parse, validate, and clean up config content.
///
/// Returns the settings and whether the file should be rewritten.
fn parse_validate_and_clean(content: &str) -> ConfigResult<(Settings, bool)> {
    let table: toml::Table = content.parse()?;
    let settings: Settings = toml::from_str(content)?;

    let has_unknown = table
        .keys()
        .any(|key| !ConfigSection::ALL.iter().any(|s| s.table_name() == key));

    // Differing canonical output means defaults were filled in
    let regenerated = generate_config_with_comments(&settings)?;
    let was_modified = has_unknown || content.trim() != regenerated.trim();

    Ok((settings, was_modified))
}

/// Serialize one section's body (without its table header).
fn section_body(settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
    let body = match section {
        ConfigSection::Planner => toml::to_string_pretty(&settings.planner)?,
        ConfigSection::Clips => toml::to_string_pretty(&settings.clips)?,
        ConfigSection::Probe => toml::to_string_pretty(&settings.probe)?,
        ConfigSection::Encoder => toml::to_string_pretty(&settings.encoder)?,
        ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
    };
    Ok(body)
}

/// Generate config content with a comment above each section.
fn generate_config_with_comments(settings: &Settings) -> ConfigResult<String> {
    let mut output = String::new();

    output.push_str("# video-fit configuration\n");
    output.push_str("# Missing keys are filled with defaults when the file is loaded.\n");

    for section in ConfigSection::ALL {
        output.push('\n');
        output.push_str(&format!("# {}\n", section.comment()));
        output.push_str(&format!("[{}]\n", section.table_name()));
        for line in section_body(settings, section)?.lines() {
            output.push_str(line);
            output.push('\n');
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("compress.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[planner]"));
        assert!(content.contains("[encoder]"));
        assert!(content.contains("# Bitrate planning policy"));
    }

    #[test]
    fn generated_file_loads_back() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");

        ConfigManager::new(&config_path).load_or_create().unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load().unwrap();
        assert_eq!(manager.settings().planner.min_video_bitrate, 200_000);
        assert_eq!(manager.settings().clips.name_prefix, "highlight_clip");
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");

        fs::write(&config_path, "[clips]\ncount = 5\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().clips.count, 5);
        // File was completed with the remaining defaults
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("count = 5"));
        assert!(content.contains("[planner]"));
    }

    #[test]
    fn load_or_create_drops_unknown_sections() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");

        fs::write(&config_path, "[legacy]\nfoo = 1\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(!content.contains("[legacy]"));
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");
        fs::write(&config_path, "[planner\nmin_video_bitrate = ").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(manager.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_or_create_rejects_invalid_values_without_rewriting() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");
        let original = "[clips]\ncount = 0\n";
        fs::write(&config_path, original).unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(
            manager.load_or_create(),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(fs::read_to_string(&config_path).unwrap(), original);
        assert_eq!(manager.settings().clips.count, 3);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");
        fs::write(&config_path, "[planner]\naudio_share_divisor = 0\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("compress.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().encoder.keep_oversized_output = true;
        manager.save().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("keep_oversized_output = true"));
    }
}
