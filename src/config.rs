use std::{
    io,
    ops::Not,
    path::{Path, PathBuf},
};

use eframe::egui;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_NAME: &str = "countdown_clock";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't find a config directory for this user")]
    NoConfigDir,
    #[error("couldn't access config file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("couldn't parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Not for Theme {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl From<Theme> for egui::Visuals {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }
}

fn default_time_format() -> String {
    "%H:%M:%S".to_string()
}

const fn default_volume() -> f32 {
    100.0
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// chrono format string for the time shown in the header
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub theme: Theme,
    /// notification sound, the built in tone is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<PathBuf>,
    /// 0 to 100
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            theme: Theme::Dark,
            sound: None,
            volume: default_volume(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// when the file can't be read or isn't a valid config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&config).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.volume = config.volume.clamp(0.0, 100.0);
        Ok(config)
    }

    /// like [`Config::load`] but falls back to the defaults, a missing file is not worth a warning
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}, using defaults");
                Self::default()
            }
        }
    }

    /// # Errors
    /// when the config directory or file can't be written
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        std::fs::write(path, config).map_err(io_err)?;
        info!("saved config to {}", path.display());
        Ok(())
    }

    /// # Errors
    /// when the platform has no config directory for this user
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = directories::ProjectDirs::from("", "", APP_NAME)
            .ok_or(ConfigError::NoConfigDir)?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    /// directory the file dialog starts in when picking a sound
    #[must_use]
    pub fn audio_dir() -> Option<PathBuf> {
        directories::UserDirs::new().and_then(|u| u.audio_dir().map(Path::to_path_buf))
    }
}
