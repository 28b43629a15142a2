//! Run settings and verbosity.
//!
//! Settings can be loaded from a YAML file; every field has a default so a
//! file only needs the keys it overrides. Command line flags are applied on
//! top by the binary.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::DEFAULT_FOCAL_LENGTH_35MM;
use crate::document::OverlaySettings;

pub const DEFAULT_OUTPUT: &str = "Img2GE.kml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid settings: {0}")]
    InvalidParams(String),
}

/// How much progress information is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum Verbosity {
    /// Image counts and the output location.
    #[default]
    Normal,
    /// Same progress lines as `Normal`; kept so `-v` is accepted.
    Verbose,
    /// Every extracted record.
    Debug,
}

impl Verbosity {
    /// Maps a repeated `-v` count to a verbosity, saturating at two.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Normal | Verbosity::Verbose => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output KML file.
    pub output: PathBuf,
    /// Descend into subdirectories of each input path.
    pub recursive: bool,
    /// Abort on the first unreadable image instead of skipping it.
    pub fail_fast: bool,
    /// Name of the top-level KML document.
    pub document_name: String,
    /// Camera altitude above ground for every overlay.
    pub altitude: f64,
    /// Distance to the projected image plane.
    pub view_distance: f64,
    /// 35mm-equivalent focal length used when an image does not record one.
    pub default_focal_length: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let overlay = OverlaySettings::default();
        Settings {
            output: PathBuf::from(DEFAULT_OUTPUT),
            recursive: false,
            fail_fast: false,
            document_name: overlay.document_name,
            altitude: overlay.altitude,
            view_distance: overlay.view_distance,
            default_focal_length: DEFAULT_FOCAL_LENGTH_35MM,
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Io`] if the file cannot be read.
    /// * [`ConfigError::Yaml`] if it is not valid YAML for [`Settings`].
    /// * [`ConfigError::InvalidParams`] if [`Settings::validate`] fails.
    pub fn load_from_yaml(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_focal_length > 0.0 && self.default_focal_length.is_finite()) {
            return Err(ConfigError::InvalidParams(format!(
                "default_focal_length must be positive, got {}",
                self.default_focal_length
            )));
        }
        if !(self.view_distance > 0.0 && self.view_distance.is_finite()) {
            return Err(ConfigError::InvalidParams(format!(
                "view_distance must be positive, got {}",
                self.view_distance
            )));
        }
        if !self.altitude.is_finite() {
            return Err(ConfigError::InvalidParams(
                "altitude must be finite".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParams(
                "output filename must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings {
            document_name: self.document_name.clone(),
            altitude: self.altitude,
            view_distance: self.view_distance,
            default_focal_length: self.default_focal_length,
        }
    }
}
