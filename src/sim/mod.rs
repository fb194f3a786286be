//! Simulation module
//!
//! All gameplay logic lives here, free of threads and I/O:
//! - Obstacle layouts are a pure function of chunk index and seed
//! - Published lists are replaced wholesale, never patched
//! - Restart bumps an epoch so stale results can be recognised

pub mod camera;
pub mod chunk;
pub mod collision;
pub mod player;
pub mod sampler;
pub mod score;
pub mod shape;
pub mod state;
pub mod tick;
pub mod vector;

pub use camera::Camera;
pub use chunk::{Chunk, ChunkLayout, ChunkManager, ChunkSurface, ObstaclePointSet, WindowPlan};
pub use collision::{CollisionDetector, RectangleBuilder};
pub use player::PlayerKinematics;
pub use sampler::BlueNoiseSampler;
pub use score::{ScoreBus, ScoreTracker, Subscription, SubscriptionId};
pub use shape::{Circle, PlayerShape, Rectangle};
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, TickOutcome, TickStart, begin_tick, finish_tick, publish_chunks, tick};
