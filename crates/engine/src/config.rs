// SPDX-License-Identifier: MIT

//!
//! Playback and marker appearance settings
//!

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur loading a [`PlaybackConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Durations, cadence and the visual mapping of magnitudes.  Every field is
/// optional in JSON (missing fields take the default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Duration of a normal seek
    pub seek_duration_ms: f64,

    /// Duration of the quick rewind before a full replay
    pub preview_duration_ms: f64,

    /// Duration of a replay up to the latest date
    pub replay_duration_ms: f64,

    /// Time between animation ticks
    pub tick_interval_ms: f64,

    /// Marker height at magnitude `0`
    pub min_height: f32,

    /// Marker height at magnitude `1`
    pub max_height: f32,

    /// Hue at magnitude `0`
    pub start_hue: f32,

    /// Hue at magnitude `1`
    pub end_hue: f32,

    pub saturation: f32,
    pub lightness: f32,

    /// Lightness of highlighted (hovered) markers
    pub highlight_lightness: f32,

    /// Width and depth of a marker
    pub footprint: f32,

    /// Magnitudes closer than this are considered equal
    pub magnitude_tolerance: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_duration_ms: 1000.0,
            preview_duration_ms: 200.0,
            replay_duration_ms: 5000.0,
            tick_interval_ms: 40.0,
            min_height: 0.01,
            max_height: 0.5,
            start_hue: 0.6,
            end_hue: 0.01,
            saturation: 1.0,
            lightness: 0.5,
            highlight_lightness: 0.95,
            footprint: 0.005,
            magnitude_tolerance: 1e-9,
        }
    }
}

impl PlaybackConfig {
    /// Load (and validate) the config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading playback config from {}", path.display());
        let data = fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        info!("Playback config loaded = {config:?}");
        Ok(config)
    }

    /// Parse (and validate) the config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PlaybackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine can't animate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("seek_duration_ms", self.seek_duration_ms),
            ("preview_duration_ms", self.preview_duration_ms),
            ("replay_duration_ms", self.replay_duration_ms),
            ("tick_interval_ms", self.tick_interval_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive (got {value})"
                )));
            }
        }
        if !(self.magnitude_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(String::from(
                "magnitude_tolerance must not be negative",
            )));
        }
        if !(self.footprint > 0.0) {
            return Err(ConfigError::Invalid(String::from(
                "footprint must be positive",
            )));
        }
        Ok(())
    }

    /// Marker height for a magnitude in `[0, 1]`
    pub fn height_for(&self, magnitude: f64) -> f32 {
        lerp(self.min_height, self.max_height, magnitude as f32)
    }

    /// Marker hue for a magnitude in `[0, 1]`
    pub fn hue_for(&self, magnitude: f64) -> f32 {
        lerp(self.start_hue, self.end_hue, magnitude as f32)
    }
}

fn lerp(from: f32, to: f32, amount: f32) -> f32 {
    from + (to - from) * amount
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.seek_duration_ms, 1000.0);
        assert_eq!(config.preview_duration_ms, 200.0);
        assert_eq!(config.replay_duration_ms, 5000.0);
        assert_eq!(config.tick_interval_ms, 40.0);
        assert_eq!(config.highlight_lightness, 0.95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = PlaybackConfig::from_json(r#"{ "seek_duration_ms": 250 }"#).unwrap();
        assert_eq!(config.seek_duration_ms, 250.0);
        assert_eq!(
            config,
            PlaybackConfig {
                seek_duration_ms: 250.0,
                ..PlaybackConfig::default()
            }
        );
        assert_eq!(PlaybackConfig::from_json("{}").unwrap(), PlaybackConfig::default());
    }

    #[test]
    fn rejects_non_positive_durations() {
        for json in [
            r#"{ "tick_interval_ms": 0 }"#,
            r#"{ "replay_duration_ms": -5 }"#,
            r#"{ "footprint": 0 }"#,
        ] {
            assert!(matches!(
                PlaybackConfig::from_json(json),
                Err(ConfigError::Invalid(_))
            ));
        }
        assert!(matches!(
            PlaybackConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn visual_mapping() {
        let config = PlaybackConfig::default();
        assert_eq!(config.height_for(0.0), 0.01);
        assert!((config.height_for(1.0) - 0.5).abs() < 1e-6);
        assert_eq!(config.hue_for(0.0), 0.6);
        assert!((config.hue_for(1.0) - 0.01).abs() < 1e-6);
        assert!((config.height_for(0.5) - 0.255).abs() < 1e-6);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            PlaybackConfig::load("/definitely/not/a/config.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
