//! Engine configuration.

use crate::model::ViewKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of the interaction engine.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Round dragged and drawn positions to the view grid.
    pub snap_to_grid: bool,
    pub logical_grid: f64,
    pub physical_grid: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per wheel delta unit.
    pub wheel_sensitivity: f64,
    /// Screen pixels a press may travel and still count as a click.
    pub drag_threshold: f64,
    /// Maximum number of history snapshots kept.
    pub history_capacity: usize,
    /// Quiet period before a burst of mutations is captured.
    pub history_debounce_ms: u64,
    /// Smallest width/height of a room, and shortest wall.
    pub min_room_size: f64,
    /// Device hit radius in screen pixels.
    pub device_hit_radius: f64,
    /// Room resize handle hit radius in screen pixels.
    pub handle_hit_radius: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            logical_grid: crate::snap::LOGICAL_GRID_SIZE,
            physical_grid: crate::snap::PHYSICAL_GRID_SIZE,
            min_zoom: crate::viewport::MIN_ZOOM,
            max_zoom: crate::viewport::MAX_ZOOM,
            wheel_sensitivity: 0.001,
            drag_threshold: crate::selection::CLICK_THRESHOLD,
            history_capacity: crate::history::MAX_HISTORY,
            history_debounce_ms: crate::history::DEBOUNCE_MS,
            min_room_size: crate::manipulation::MIN_ROOM_SIZE,
            device_hit_radius: 24.0,
            handle_hit_radius: 8.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.logical_grid <= 0.0 || self.physical_grid <= 0.0 {
            return Err(ConfigError::Invalid("grid sizes must be positive".into()));
        }
        if self.drag_threshold < 0.0 || self.min_room_size < 0.0 {
            return Err(ConfigError::Invalid("thresholds must not be negative".into()));
        }
        Ok(())
    }

    /// Grid size of a view.
    pub fn grid_size(&self, view: ViewKind) -> f64 {
        match view {
            ViewKind::Logical => self.logical_grid,
            ViewKind::Physical => self.physical_grid,
        }
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.history_debounce_ms)
    }
}
