//! Per-frame simulation tick
//!
//! The stages run in a fixed order:
//!
//! 1. input and kinematics: aim, turn, move; camera and score follow
//! 2. chunk window: recompute the current chunk from the new travel
//! 3. chunk generation and publication (may run on a worker)
//! 4. collision rebuild from the active chunk (may run on a worker)
//! 5. collision test; a hit ends the run
//!
//! [`begin_tick`] covers stages 1 and 2 and hands back the chunk plan, if
//! any. The caller generates and publishes (stages 3 and 4), then calls
//! [`finish_tick`]. [`tick`] does all of it in place on the calling thread.

use glam::Vec2;

use super::chunk::{Chunk, WindowPlan};
use super::state::{GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Screen-space tap to steer toward
    pub tap: Option<Vec2>,
}

/// What stages 1 and 2 produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickStart {
    /// Player displacement this tick
    pub movement: Vec2,
    /// Chunk window change to carry out, if the player changed chunk
    pub plan: Option<WindowPlan>,
}

/// Result of a whole tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    pub movement: Vec2,
    /// The resident chunk list was replaced
    pub chunks_changed: bool,
    /// World-space corner of the rectangle hit this tick
    pub impact: Option<Vec2>,
    pub game_over: bool,
}

/// Input, kinematics, camera, score and chunk planning
///
/// Returns `None` once the game is over. The first tick after init or
/// restart moves nothing, whatever `dt` says.
pub fn begin_tick(state: &mut GameState, input: &TickInput, dt: f32) -> Option<TickStart> {
    if state.phase == GamePhase::GameOver {
        return None;
    }

    if let Some(tap) = input.tap {
        state.player.set_goal_from_tap(tap);
    }

    let dt = if state.bootstrapped {
        dt.max(0.0)
    } else {
        log::debug!("Bootstrap tick");
        state.bootstrapped = true;
        0.0
    };

    let movement = state.player.integrate(dt);
    state.camera.follow(movement);

    let travel = state.player.travel_y();
    if let Some(score) = state.score.update(travel, &mut state.bus) {
        log::trace!("Score {}", score);
    }

    let plan = state.chunks.plan(travel);
    state.time_ticks += 1;

    Some(TickStart { movement, plan })
}

/// Publish generated chunks and rebuild collision from the active chunk
///
/// Returns false if the plan was made before a restart; nothing changes then.
pub fn publish_chunks(state: &mut GameState, plan: WindowPlan, generated: Vec<Chunk>) -> bool {
    if state.chunks.apply(plan, generated).is_none() {
        return false;
    }
    let points = state.chunks.current_points();
    state.collision.rebuild(&points);
    true
}

/// Collision test and game-over transition
pub fn finish_tick(state: &mut GameState, movement: Vec2, chunks_changed: bool) -> TickOutcome {
    let impact = state.collision.test(&state.player.shape());
    if let Some(origin) = impact {
        state.phase = GamePhase::GameOver;
        state.last_impact = Some(origin);
        log::info!(
            "Game over: hit rectangle at ({:.0}, {:.0}), score {}",
            origin.x,
            origin.y,
            state.score.score()
        );
    }

    TickOutcome {
        movement,
        chunks_changed,
        impact,
        game_over: state.is_game_over(),
    }
}

/// Advance the game by one frame, generating chunks on this thread
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickOutcome {
    let Some(start) = begin_tick(state, input, dt) else {
        return TickOutcome {
            game_over: true,
            ..TickOutcome::default()
        };
    };

    let chunks_changed = match start.plan {
        Some(plan) => {
            let layout = state.chunks.layout();
            let generated = plan.generate.iter().map(|&index| layout.generate(index)).collect();
            publish_chunks(state, plan, generated)
        }
        None => false,
    };

    finish_tick(state, start.movement, chunks_changed)
}
