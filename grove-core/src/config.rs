//! Immutable parameters of a growth session.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of a [`crate::controller::GrowthController`].
///
/// Fixed for the lifetime of a controller. Every field has a default, so a
/// TOML file only needs to list the values it overrides:
///
/// ```toml
/// initial_scale = 0.5
/// target_scale = 9.0
/// growth_threshold = 80.0
/// shrink_increment = inf   # snap straight back to the initial scale
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lower scale bound; the tree starts here.
    pub initial_scale: f64,
    /// Upper scale bound; reaching it spawns a neighbour.
    pub target_scale: f64,
    /// Heart rate (BPM) at or above which the tree shrinks.
    pub growth_threshold: f64,
    /// Scale added per growing tick. May be `inf`.
    pub growth_increment: f64,
    /// Scale removed per shrinking tick. May be `inf`.
    pub shrink_increment: f64,
    pub tick_interval_growing_ms: u64,
    pub tick_interval_shrinking_ms: u64,
    /// Number of recent samples kept for display.
    pub history_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_scale: 0.5,
            target_scale: 9.0,
            growth_threshold: 80.0,
            growth_increment: 0.01,
            shrink_increment: 0.005,
            tick_interval_growing_ms: 100,
            tick_interval_shrinking_ms: 100,
            history_len: 20,
        }
    }
}

impl Config {
    /// Parses and validates a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the invariants the controller relies on.
    ///
    /// ### Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_scale.is_finite() || self.initial_scale <= 0.0 {
            return Err(ConfigError::invalid(
                "initial_scale",
                format!("must be finite and positive, got {}", self.initial_scale),
            ));
        }
        if !self.target_scale.is_finite() || self.target_scale <= self.initial_scale {
            return Err(ConfigError::invalid(
                "target_scale",
                format!(
                    "must be finite and greater than initial_scale ({}), got {}",
                    self.initial_scale, self.target_scale
                ),
            ));
        }
        if !self.growth_threshold.is_finite() {
            return Err(ConfigError::invalid(
                "growth_threshold",
                format!("must be finite, got {}", self.growth_threshold),
            ));
        }
        if self.growth_increment.is_nan() || self.growth_increment <= 0.0 {
            return Err(ConfigError::invalid(
                "growth_increment",
                format!("must be positive, got {}", self.growth_increment),
            ));
        }
        if self.shrink_increment.is_nan() || self.shrink_increment <= 0.0 {
            return Err(ConfigError::invalid(
                "shrink_increment",
                format!("must be positive, got {}", self.shrink_increment),
            ));
        }
        if self.tick_interval_growing_ms == 0 {
            return Err(ConfigError::invalid(
                "tick_interval_growing_ms",
                "must be non-zero",
            ));
        }
        if self.tick_interval_shrinking_ms == 0 {
            return Err(ConfigError::invalid(
                "tick_interval_shrinking_ms",
                "must be non-zero",
            ));
        }
        if self.history_len == 0 {
            return Err(ConfigError::invalid("history_len", "must be non-zero"));
        }
        Ok(())
    }

    pub fn tick_interval_growing(&self) -> Duration {
        Duration::from_millis(self.tick_interval_growing_ms)
    }

    pub fn tick_interval_shrinking(&self) -> Duration {
        Duration::from_millis(self.tick_interval_shrinking_ms)
    }
}
