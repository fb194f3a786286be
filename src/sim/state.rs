//! Game state
//!
//! Everything one run of the game owns, grouped so the tick pipeline can
//! borrow the pieces it needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::chunk::ChunkManager;
use super::collision::CollisionDetector;
use super::player::PlayerKinematics;
use super::score::{ScoreBus, ScoreTracker};
use crate::settings::{ConfigError, GameConfig};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player moving through the corridor
    Playing,
    /// Player hit something; only a restart leaves this phase
    GameOver,
}

/// Complete state of one game
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub player: PlayerKinematics,
    pub chunks: ChunkManager,
    pub collision: CollisionDetector,
    pub score: ScoreTracker,
    /// Score change broadcast; the player listens on it
    pub bus: ScoreBus,
    pub camera: Camera,
    /// World-space corner of the rectangle that ended the run
    pub last_impact: Option<Vec2>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// False until the first tick after init or restart has run
    pub bootstrapped: bool,
}

impl GameState {
    /// Fresh game; fails if the config cannot be simulated
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut player = PlayerKinematics::new(&config);
        let chunks = ChunkManager::new(&config, player.screen_position().y);
        let collision = CollisionDetector::new(chunks.layout());
        let mut bus = ScoreBus::new();
        player.attach(&mut bus);

        log::info!(
            "New game: {}x{} viewport, {} chunks resident, seed {}",
            config.viewport_width,
            config.viewport_height,
            chunks.chunks_to_load(),
            config.base_seed
        );

        Ok(Self {
            score: ScoreTracker::new(config.score_increase_dist),
            config,
            phase: GamePhase::Playing,
            player,
            chunks,
            collision,
            bus,
            camera: Camera::new(),
            last_impact: None,
            time_ticks: 0,
            bootstrapped: false,
        })
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Back to the post-init state; in-flight chunk and collision work is invalidated
    pub fn restart(&mut self) {
        log::info!("Restarting (previous score {})", self.score.score());
        self.player.restart();
        self.chunks.restart();
        self.collision.restart();
        self.score.restart();
        self.camera.restart();
        self.phase = GamePhase::Playing;
        self.last_impact = None;
        self.time_ticks = 0;
        self.bootstrapped = false;
    }

    /// Stop the player listening for score changes
    pub fn shutdown(&mut self) {
        self.player.detach(&mut self.bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready_to_play() {
        let state = GameState::new(GameConfig::default()).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.bootstrapped);
        assert!(state.player.is_attached());
        assert_eq!(state.bus.subscriber_count(), 1);
        assert!(state.chunks.resident_indices().is_empty());
        assert!(state.collision.rectangles().is_empty());
    }

    #[test]
    fn test_restart_bumps_epochs() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.phase = GamePhase::GameOver;
        state.last_impact = Some(Vec2::ONE);
        state.bootstrapped = true;

        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.last_impact, None);
        assert!(!state.bootstrapped);
        assert_eq!(state.chunks.epoch(), 1);
        assert_eq!(state.collision.epoch(), 1);
        assert!(state.player.is_attached());
    }

    #[test]
    fn test_shutdown_unsubscribes() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.shutdown();
        assert_eq!(state.bus.subscriber_count(), 0);
        assert!(!state.player.is_attached());
    }
}
