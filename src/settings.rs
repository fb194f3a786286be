//! Game configuration
//!
//! Every tunable of the corridor, sampler and player lives here. Stored as
//! JSON; missing fields fall back to the defaults in `crate::consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Viewport ===
    pub viewport_width: u32,
    pub viewport_height: u32,

    // === Corridor ===
    /// Height of one chunk in world units
    pub chunk_height: u32,
    /// Width of the obstacle field between the two walls
    pub sample_width: f32,
    /// Side of one obstacle square
    pub square_size: f32,
    /// Width of each boundary wall
    pub boundary_width: f32,
    /// Extra inset on the right/bottom so stroked squares stay inside the chunk
    pub stroke_margin: f32,
    /// Smallest number of chunks kept resident
    pub min_chunks_to_load: usize,

    // === Sampler ===
    pub base_seed: i64,
    /// Target spacing between obstacle anchors
    pub min_distance: f32,
    pub cells_per_min_distance: u32,
    pub max_cell_dist: u32,

    // === Player ===
    pub player_radius: f32,
    pub base_speed: f32,
    pub max_speed: f32,
    /// Radians per second
    pub base_turn_rate: f32,
    /// Score interval between speed steps
    pub speed_step_points: u32,
    /// Fractional speed gain per step
    pub speed_step_rate: f32,

    // === Score ===
    /// Vertical distance worth one point
    pub score_increase_dist: f32,

    // === Runtime ===
    /// Threads in the background generation pool
    pub worker_threads: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1080,
            viewport_height: 2000,

            chunk_height: CHUNK_HEIGHT,
            sample_width: SAMPLE_WIDTH,
            square_size: SQUARE_SIZE,
            boundary_width: BOUNDARY_WIDTH,
            stroke_margin: 0.0,
            min_chunks_to_load: MIN_CHUNK_LOAD,

            base_seed: BASE_SEED,
            min_distance: GOAL_DISTANCE,
            cells_per_min_distance: CELLS_PER_MIN_DISTANCE,
            max_cell_dist: MAX_CELL_DIST,

            player_radius: PLAYER_RADIUS,
            base_speed: PLAYER_BASE_SPEED,
            max_speed: PLAYER_MAX_SPEED,
            base_turn_rate: PLAYER_BASE_TURN_RATE,
            speed_step_points: SPEED_STEP_POINTS,
            speed_step_rate: SPEED_STEP_RATE,

            score_increase_dist: SQUARE_SIZE,

            worker_threads: 2,
        }
    }
}

impl GameConfig {
    /// Config for a given screen size, everything else default
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..Self::default()
        }
    }

    /// Chunks kept resident: one screen's worth plus one, never fewer than the minimum
    pub fn chunks_to_load(&self) -> usize {
        let per_screen = (self.viewport_height / self.chunk_height.max(1)) as usize + 1;
        per_screen.max(self.min_chunks_to_load)
    }

    /// Where the player starts, and stays, on screen
    pub fn player_screen_position(&self) -> glam::Vec2 {
        glam::Vec2::new(
            self.viewport_width as f32 / 2.0,
            self.viewport_height as f32 / 2.0,
        )
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &str| Err(ConfigError::Invalid(what.to_string()));

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return invalid("viewport must be non-empty");
        }
        if self.chunk_height == 0 {
            return invalid("chunk_height must be positive");
        }
        if !(self.square_size > 0.0) {
            return invalid("square_size must be positive");
        }
        if self.min_chunks_to_load < MIN_CHUNK_LOAD {
            return invalid("min_chunks_to_load must be at least 3");
        }
        if !(self.min_distance >= self.square_size) {
            return invalid("min_distance must be at least square_size");
        }
        if self.cells_per_min_distance == 0 || self.max_cell_dist == 0 {
            return invalid("sampler grid parameters must be at least 1");
        }
        let cell = self.min_distance / self.cells_per_min_distance as f32;
        let cells = (self.sample_width / cell).ceil() * (self.chunk_height as f32 / cell).ceil();
        if !(cells <= MAX_SAMPLER_CELLS as f32) {
            return invalid("sampler grid too fine for the chunk size");
        }
        if !(self.player_radius > 0.0) {
            return invalid("player_radius must be positive");
        }
        if !(self.score_increase_dist > 0.0) {
            return invalid("score_increase_dist must be positive");
        }
        if self.speed_step_points == 0 {
            return invalid("speed_step_points must be at least 1");
        }
        Ok(())
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.as_ref().display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.as_ref().display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_to_load() {
        let config = GameConfig::for_viewport(1080, 2000);
        assert_eq!(config.chunks_to_load(), 3);

        let tall = GameConfig::for_viewport(1080, 6500);
        assert_eq!(tall.chunks_to_load(), 4);

        let short = GameConfig::for_viewport(1080, 500);
        assert_eq!(short.chunks_to_load(), 3);
    }

    #[test]
    fn test_default_geometry() {
        let config = GameConfig::default();
        assert_eq!(config.boundary_width, config.square_size * 2.0);
        assert_eq!(config.player_screen_position(), glam::Vec2::new(540.0, 1000.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = GameConfig {
            chunk_height: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = GameConfig {
            min_distance: -1.0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            min_chunks_to_load: 2,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // Smaller than one obstacle square
        let config = GameConfig {
            min_distance: 0.001,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        // Valid spacing, but far too many cells per chunk
        let config = GameConfig {
            cells_per_min_distance: 200,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let open = GameConfig {
            min_distance: 8000.0,
            ..GameConfig::default()
        };
        assert!(open.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slider.json");

        let config = GameConfig {
            base_seed: 99,
            ..GameConfig::for_viewport(720, 1280)
        };
        config.save(&path).unwrap();
        assert_eq!(GameConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slider.json");
        std::fs::write(&path, r#"{ "base_seed": 7 }"#).unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.base_seed, 7);
        assert_eq!(config.chunk_height, CHUNK_HEIGHT);
    }

    #[test]
    fn test_load_or_default_on_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(GameConfig::load_or_default(&missing), GameConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert_eq!(GameConfig::load_or_default(&broken), GameConfig::default());
    }
}
