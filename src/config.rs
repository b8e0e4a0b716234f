//! Application settings
//!
//! Handles loading and saving the user settings in config.json. Settings are
//! passed explicitly to the operations that need them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name under the platform config directory
const APP_DIR_NAME: &str = "disc-shelf";

/// Settings file name
const SETTINGS_FILE_NAME: &str = "config.json";

/// Errors that can occur when saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted user settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Path to the emulator executable
    #[serde(default)]
    pub emulator_path: String,
    /// Last scanned directory
    #[serde(default)]
    pub last_dir: String,
    /// Pass `-f` to the emulator
    #[serde(default = "default_fullscreen")]
    pub fullscreen: bool,
    /// Extra emulator arguments, whitespace separated
    #[serde(default)]
    pub extra_args: String,
    /// Name of the active controller profile
    #[serde(default)]
    pub active_profile: String,
    /// Whether first-run setup has been completed
    #[serde(default)]
    pub is_configured: bool,
}

fn default_fullscreen() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emulator_path: String::new(),
            last_dir: String::new(),
            fullscreen: default_fullscreen(),
            extra_args: String::new(),
            active_profile: String::new(),
            is_configured: false,
        }
    }
}

impl Settings {
    /// Emulator executable, if one has been chosen
    pub fn emulator(&self) -> Option<&Path> {
        let trimmed = self.emulator_path.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }

    /// Last scanned directory, if any
    pub fn last_directory(&self) -> Option<&Path> {
        let trimmed = self.last_dir.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.emulator_path {
            self.emulator_path = v;
        }
        if let Some(v) = patch.last_dir {
            self.last_dir = v;
        }
        if let Some(v) = patch.fullscreen {
            self.fullscreen = v;
        }
        if let Some(v) = patch.extra_args {
            self.extra_args = v;
        }
        if let Some(v) = patch.active_profile {
            self.active_profile = v;
        }
        if let Some(v) = patch.is_configured {
            self.is_configured = v;
        }
    }
}

/// Partial settings update; `None` fields are left untouched
#[derive(Debug, Default, Clone)]
pub struct SettingsPatch {
    pub emulator_path: Option<String>,
    pub last_dir: Option<String>,
    pub fullscreen: Option<bool>,
    pub extra_args: Option<String>,
    pub active_profile: Option<String>,
    pub is_configured: Option<bool>,
}

/// Reads and writes the settings file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory, falling back to the current directory
    pub fn default_location() -> Self {
        let path = match dirs::config_dir() {
            Some(dir) => dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME),
            None => {
                log::warn!("No config directory available, using ./{}", SETTINGS_FILE_NAME);
                PathBuf::from(SETTINGS_FILE_NAME)
            }
        };
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, using defaults when the file is missing or invalid
    pub fn load(&self) -> Settings {
        match self.load_from_path() {
            Ok(settings) => {
                log::info!("Loaded settings from {}", self.path.display());
                settings
            }
            Err(e) => {
                log::info!("No usable settings at {} ({}), using defaults", self.path.display(), e);
                Settings::default()
            }
        }
    }

    fn load_from_path(&self) -> Result<Settings, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Write settings, creating the parent directory if needed
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Merge a patch into the stored settings and return the result
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings, ConfigError> {
        let mut settings = self.load();
        settings.apply(patch);
        self.save(&settings)?;
        Ok(settings)
    }
}
