use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use timer_core::{DEFAULT_MINUTES, DEFAULT_SECONDS};

/// User preferences, read once at startup. Missing file or unknown keys fall
/// back to defaults; a malformed file is logged and ignored, never fatal.
/// Timer state itself is never persisted.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Initial minutes on the picker.
    pub minutes: u8,
    /// Initial seconds on the picker.
    pub seconds: u8,
    /// Play the alarm sound on completion.
    pub audio: bool,
    /// Post a desktop notification on completion.
    pub notification: bool,
    /// Flash the display in the vibration pattern on completion.
    pub flash: bool,
    /// Alarm sound file; falls back to probing system alert sounds.
    pub sound: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_MINUTES,
            seconds: DEFAULT_SECONDS,
            audio: true,
            notification: true,
            flash: true,
            sound: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(raw) => Self::parse(&raw, &path.display().to_string()),
            Err(_) => Self::default(), // no config file yet
        }
    }

    fn parse(raw: &str, origin: &str) -> Self {
        match toml::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed config {}: {}", origin, err);
                Self::default()
            }
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("countdown").join("config.toml"))
}
