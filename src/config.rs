//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::bus::ErrorCode;
use crate::consts::{COMMAND_QUEUE_CAPACITY, HISTORY_LIMIT, RENDER_DEBOUNCE_MS, ZOOM_STEP};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("SCENE_ZOOM_STEP must be a finite number greater than 1, got {0}")]
    InvalidZoomStep(f64),
    #[error("SCENE_HISTORY_LIMIT must be at least 1")]
    InvalidHistoryLimit,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidZoomStep(_) => "E_CONFIG_ZOOM_STEP",
            Self::InvalidHistoryLimit => "E_CONFIG_HISTORY_LIMIT",
        }
    }
}

/// Tuning knobs for the scene editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Factor applied per zoom in/out step.
    pub zoom_step: f64,
    /// Snapshots kept per scene.
    pub history_limit: usize,
    /// Quiet period before the scene-rendered announcement, in milliseconds.
    pub render_debounce_ms: u64,
    /// Bounded command channel capacity for the editor actor.
    pub command_queue_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_step: ZOOM_STEP,
            history_limit: HISTORY_LIMIT,
            render_debounce_ms: RENDER_DEBOUNCE_MS,
            command_queue_capacity: COMMAND_QUEUE_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SCENE_ZOOM_STEP`: default 1.2
    /// - `SCENE_HISTORY_LIMIT`: default 100
    /// - `SCENE_RENDER_DEBOUNCE_MS`: default 200
    /// - `SCENE_COMMAND_QUEUE_CAPACITY`: default 256
    ///
    /// Unparsable values fall back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a parsed value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            zoom_step: env_parse("SCENE_ZOOM_STEP", ZOOM_STEP),
            history_limit: env_parse("SCENE_HISTORY_LIMIT", HISTORY_LIMIT),
            render_debounce_ms: env_parse("SCENE_RENDER_DEBOUNCE_MS", RENDER_DEBOUNCE_MS),
            command_queue_capacity: env_parse("SCENE_COMMAND_QUEUE_CAPACITY", COMMAND_QUEUE_CAPACITY).max(1),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-finite or non-expanding zoom step,
    /// or a zero history limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(ConfigError::InvalidZoomStep(self.zoom_step));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key).map_or(default, |v| v.trim().parse::<T>().unwrap_or(default))
}
