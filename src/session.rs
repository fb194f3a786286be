//! Game session
//!
//! Drives one [`GameState`] frame by frame for an outside caller: queues
//! taps, runs the tick pipeline with chunk generation and collision rebuilds
//! on the [`GenerationWorker`], hands finished scores to the score store and
//! exposes what a renderer needs through [`FrameSnapshot`].

use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

use crate::highscores::ScoreStore;
use crate::settings::{ConfigError, GameConfig};
use crate::sim::chunk::{Chunk, ObstaclePointSet, WindowPlan};
use crate::sim::collision::CollisionDetector;
use crate::sim::shape::Rectangle;
use crate::sim::state::GameState;
use crate::sim::tick::{self, TickInput, TickOutcome};
use crate::worker::{GenerationWorker, WorkerError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Everything a renderer draws for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Resident chunks with their surfaces and world offsets
    pub chunks: Arc<[Chunk]>,
    pub player_position: Vec2,
    pub player_radius: f32,
    /// Directional marker outline, see `PlayerKinematics::drawing_vertices`
    pub player_vertices: [Vec2; 6],
    /// Translation to apply to world-space drawing
    pub camera_offset: Vec2,
    pub score: u32,
    pub game_over: bool,
    /// World-space corner of the rectangle that ended the run
    pub last_impact: Option<Vec2>,
}

/// One player's game, from first frame to teardown
#[derive(Debug)]
pub struct GameSession<S: ScoreStore> {
    state: GameState,
    worker: GenerationWorker,
    store: S,
    /// Input collected since the last tick
    input: TickInput,
    score_recorded: bool,
}

impl<S: ScoreStore> GameSession<S> {
    pub fn new(config: GameConfig, store: S) -> Result<Self, SessionError> {
        let state = GameState::new(config)?;
        let worker = GenerationWorker::new(state.config.worker_threads)?;
        Ok(Self {
            state,
            worker,
            store,
            input: TickInput::default(),
            score_recorded: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Steer toward a screen-space point on the next tick
    ///
    /// Several taps between two ticks: the last one wins.
    pub fn tap(&mut self, screen: Vec2) {
        self.input.tap = Some(screen);
    }

    /// Run one frame with `dt` seconds elapsed
    pub fn advance(&mut self, dt: f32) -> TickOutcome {
        let input = std::mem::take(&mut self.input);
        let Some(start) = tick::begin_tick(&mut self.state, &input, dt) else {
            return TickOutcome {
                game_over: true,
                ..TickOutcome::default()
            };
        };

        let chunks_changed = match start.plan {
            Some(plan) => self.generate_and_publish(plan),
            None => false,
        };

        let outcome = tick::finish_tick(&mut self.state, start.movement, chunks_changed);
        if outcome.game_over && !self.score_recorded {
            self.record_score();
        }
        outcome
    }

    /// Generate on the worker, publish, then rebuild collision on the worker
    ///
    /// A failed generation publishes nothing; the chunk manager proposes the
    /// same window again next tick.
    fn generate_and_publish(&mut self, plan: WindowPlan) -> bool {
        let layout = Arc::clone(self.state.chunks.layout());
        let generated = match self
            .worker
            .generate_chunks(layout, plan.generate.clone())
            .wait()
        {
            Ok(chunks) => chunks,
            Err(e) => {
                log::warn!("Chunk generation for {:?} failed: {}", plan.generate, e);
                return false;
            }
        };

        if self.state.chunks.apply(plan, generated).is_none() {
            return false;
        }

        let points = self.state.chunks.current_points();
        let job_points = points.clone();
        let builder = self.state.collision.builder();
        let epoch = self.state.collision.epoch();
        let built = self.worker.submit(move || builder.build(&job_points)).wait();
        install_rebuild(&mut self.state.collision, epoch, built, &points);
        true
    }

    fn record_score(&mut self) {
        self.score_recorded = true;
        let score = self.state.score.score();
        match self.store.insert_and_trim(score) {
            Ok(Some(rank)) => log::info!("Score {} ranked #{}", score, rank),
            Ok(None) => log::debug!("Score {} did not make the table", score),
            Err(e) => log::warn!("Failed to save score {}: {}", score, e),
        }
    }

    /// Start over; allowed at any time
    pub fn restart(&mut self) {
        self.state.restart();
        self.input = TickInput::default();
        self.score_recorded = false;
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let player = &self.state.player;
        FrameSnapshot {
            chunks: self.state.chunks.chunks(),
            player_position: player.position(),
            player_radius: player.radius(),
            player_vertices: player.drawing_vertices(),
            camera_offset: self.state.camera.offset(),
            score: self.state.score.score(),
            game_over: self.state.is_game_over(),
            last_impact: self.state.last_impact,
        }
    }
}

impl<S: ScoreStore> Drop for GameSession<S> {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}

/// Install an off-thread collision rebuild, or rebuild here if the job failed
fn install_rebuild(
    collision: &mut CollisionDetector,
    epoch: u64,
    built: Result<Arc<[Rectangle]>, WorkerError>,
    points: &ObstaclePointSet,
) {
    match built {
        Ok(rects) => {
            collision.install(epoch, rects);
        }
        Err(e) => {
            log::warn!("Collision rebuild failed ({}), rebuilding in place", e);
            collision.rebuild(points);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryScoreStore;
    use crate::sim::chunk::ChunkLayout;

    #[test]
    fn test_failed_rebuild_falls_back_to_in_place() {
        let layout = ChunkLayout::new(&GameConfig::default(), 1000.0);
        let mut collision = CollisionDetector::new(&layout);
        let old = ObstaclePointSet {
            points: vec![Vec2::new(500.0, 500.0)].into(),
            offset: layout.chunk_offset(0),
        };
        collision.rebuild(&old);

        let next = ObstaclePointSet {
            points: vec![Vec2::new(700.0, 300.0), Vec2::new(900.0, 900.0)].into(),
            offset: layout.chunk_offset(1),
        };
        let epoch = collision.epoch();
        install_rebuild(&mut collision, epoch, Err(WorkerError::Disconnected), &next);

        // The active chunk's rectangles, not the previous chunk's
        assert_eq!(collision.rectangles(), collision.builder().build(&next));
        assert_eq!(collision.rectangles().len(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            min_chunks_to_load: 2,
            ..GameConfig::default()
        };
        let result = GameSession::new(config, MemoryScoreStore::new());
        assert!(matches!(result, Err(SessionError::Config(ConfigError::Invalid(_)))));
    }
}
