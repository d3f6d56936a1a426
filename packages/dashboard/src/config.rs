//! Dashboard settings loaded from TOML.
//!
//! The default configuration in `config/dashboard.toml` is baked into the
//! binary at compile time via [`include_str!`]. Passing a path to
//! [`DashboardConfig::load`] replaces it wholesale with a user file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use wildfire_risk_models::{EnvironmentalInputs, Location};

use crate::heat::HeatLayerStyle;
use crate::map::{MAX_ZOOM, MIN_ZOOM};

/// Default configuration embedded at compile time.
const DEFAULT_CONFIG: &str = include_str!("../config/dashboard.toml");

/// Errors from loading or validating a dashboard config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("TOML error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description.
        message: String,
    },
}

/// Initial map view.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Initial center latitude.
    pub center_lat: f64,
    /// Initial center longitude.
    pub center_lng: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

/// Terminal front-end settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UiConfig {
    /// Redraw interval in milliseconds.
    pub tick_rate_ms: u64,
    /// Number of log lines kept in the event-log pane.
    pub event_log_capacity: usize,
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Initial map view.
    pub map: MapConfig,
    /// Initial slider values.
    pub inputs: EnvironmentalInputs,
    /// Heat layer style.
    pub heat: HeatLayerStyle,
    /// Front-end settings.
    pub ui: UiConfig,
}

impl DashboardConfig {
    /// The configuration shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded file fails to parse or
    /// validate.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Loads the config at `path`, or the embedded default when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };

        log::info!("Loading dashboard config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or invalid.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid { message };

        if !(-90.0..=90.0).contains(&self.map.center_lat) {
            return Err(invalid(format!(
                "map.center_lat {} must be within [-90, 90]",
                self.map.center_lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.map.center_lng) {
            return Err(invalid(format!(
                "map.center_lng {} must be within [-180, 180]",
                self.map.center_lng
            )));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.map.zoom) {
            return Err(invalid(format!(
                "map.zoom {} must be within [{MIN_ZOOM}, {MAX_ZOOM}]",
                self.map.zoom
            )));
        }
        if self.inputs != EnvironmentalInputs::new(
            self.inputs.temperature,
            self.inputs.humidity,
            self.inputs.wind_speed,
        ) {
            return Err(invalid(format!(
                "inputs {:?} fall outside the slider ranges",
                self.inputs
            )));
        }
        self.heat.validate().map_err(invalid)?;
        if self.ui.tick_rate_ms == 0 {
            return Err(invalid("ui.tick_rate_ms must be positive".to_string()));
        }
        if self.ui.event_log_capacity == 0 {
            return Err(invalid("ui.event_log_capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// Initial map center.
    #[must_use]
    pub const fn map_center(&self) -> Location {
        Location::new(self.map.center_lat, self.map.center_lng)
    }

    /// Redraw interval.
    #[must_use]
    pub const fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_shipped_defaults() {
        let config = DashboardConfig::embedded().unwrap();
        assert!((config.map.center_lat - 51.4545).abs() < f64::EPSILON);
        assert!((config.map.center_lng - -2.5879).abs() < f64::EPSILON);
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.inputs, EnvironmentalInputs::default());
        assert_eq!(config.heat, HeatLayerStyle::default());
        assert_eq!(config.tick_rate(), Duration::from_millis(100));
    }

    #[test]
    fn rejects_zoom_outside_supported_range() {
        let text = DEFAULT_CONFIG.replace("zoom = 10", "zoom = 19");
        let err = DashboardConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_out_of_range_slider_default() {
        let text = DEFAULT_CONFIG.replace("humidity = 40", "humidity = 140");
        assert!(DashboardConfig::parse(&text).is_err());
    }

    #[test]
    fn rejects_malformed_colour() {
        let text = DEFAULT_CONFIG.replace("#13c2c2", "teal");
        assert!(matches!(
            DashboardConfig::parse(&text).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DashboardConfig::load(Some(Path::new("/nonexistent/dashboard.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dashboard.toml"));
    }
}
