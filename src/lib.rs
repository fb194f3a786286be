//! Slider - terrain and collision core of an endless vertical corridor game
//!
//! Core modules:
//! - `sim`: Simulation (obstacle sampling, chunk window, collision, player)
//! - `worker`: Background pool for chunk generation and collision rebuilds
//! - `session`: Frame-driving façade over the simulation
//! - `highscores`: Top-10 score store
//! - `settings`: Game configuration

pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;
pub mod worker;

pub use highscores::{HighScores, JsonScoreStore, MemoryScoreStore, ScoreRecord, ScoreStore};
pub use session::{FrameSnapshot, GameSession, SessionError};
pub use settings::{ConfigError, GameConfig};
pub use worker::{GenerationWorker, Pending, WorkerError};

/// Game configuration constants
pub mod consts {
    /// Side of one obstacle square
    pub const SQUARE_SIZE: f32 = 64.0;
    /// Corridor walls are two squares wide
    pub const BOUNDARY_WIDTH: f32 = SQUARE_SIZE * 2.0;
    /// Width of the obstacle field between the walls
    pub const SAMPLE_WIDTH: f32 = 4500.0;
    pub const CHUNK_HEIGHT: u32 = 2000;
    /// Never keep fewer chunks than this resident
    pub const MIN_CHUNK_LOAD: usize = 3;

    /// Chunk `i` is sampled with seed `BASE_SEED + i`
    pub const BASE_SEED: i64 = 6104970;
    /// Spacing the obstacle sampler aims for
    pub const GOAL_DISTANCE: f32 = 200.0;
    pub const CELLS_PER_MIN_DISTANCE: u32 = 1;
    /// Taxicab reach of an accepted point on the sampler grid
    pub const MAX_CELL_DIST: u32 = 2;
    /// Upper bound on sampler grid cells per chunk
    pub const MAX_SAMPLER_CELLS: usize = 1 << 20;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 16.0;
    pub const PLAYER_BASE_SPEED: f32 = 300.0;
    pub const PLAYER_MAX_SPEED: f32 = 540.0;
    pub const PLAYER_BASE_TURN_RATE: f32 = std::f32::consts::FRAC_PI_3;

    /// Speed and turn rate go up by `SPEED_STEP_RATE` every `SPEED_STEP_POINTS`
    pub const SPEED_STEP_POINTS: u32 = 50;
    pub const SPEED_STEP_RATE: f32 = 0.1;
}
