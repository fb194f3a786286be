//! Slider headless runner
//!
//! Plays a few scripted runs without a window: the player weaves left and
//! right until it hits something, then the score goes to the high score
//! file and the next run starts.
//!
//! `SLIDER_CONFIG` points at a config file (default `slider.json`),
//! `SLIDER_SCORES` at the high score file (default `slider_scores.json`).

use anyhow::{Context, Result};
use glam::Vec2;

use slider_core::{GameConfig, GameSession, JsonScoreStore, ScoreStore};

/// 60 frames per second
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on a run after this many frames
const MAX_FRAMES: u32 = 60 * 120;
const RUNS: u32 = 3;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Slider (headless) starting...");

    let config_path = std::env::var("SLIDER_CONFIG").unwrap_or_else(|_| "slider.json".into());
    let scores_path =
        std::env::var("SLIDER_SCORES").unwrap_or_else(|_| "slider_scores.json".into());

    let config = GameConfig::load_or_default(&config_path);
    let store = JsonScoreStore::open(&scores_path)
        .with_context(|| format!("opening high scores at {}", scores_path))?;
    log::info!("High scores at {}", store.path().display());
    let mut session =
        GameSession::new(config.clone(), store).context("starting game session")?;

    let center = config.player_screen_position();
    for run in 1..=RUNS {
        let frames = play(&mut session, center, run);
        let snapshot = session.snapshot();
        println!(
            "Run {}: score {} after {:.1}s{}",
            run,
            snapshot.score,
            frames as f32 * FRAME_DT,
            match snapshot.last_impact {
                Some(at) => format!(", hit at ({:.0}, {:.0})", at.x, at.y),
                None => String::new(),
            }
        );
        session.restart();
    }

    println!("High scores:");
    for (rank, record) in session.store().top_ten().iter().enumerate() {
        println!("  {:>2}. {}", rank + 1, record.score);
    }
    Ok(())
}

/// Play one run; returns the number of frames it lasted
fn play<S: ScoreStore>(session: &mut GameSession<S>, center: Vec2, run: u32) -> u32 {
    // Each run weaves with a different period
    let period = 45 + run * 15;
    for frame in 0..MAX_FRAMES {
        if frame % period == 0 {
            let side = if (frame / period) % 2 == 0 { -1.0 } else { 1.0 };
            session.tap(center + Vec2::new(side * 400.0, -600.0));
        }
        if session.advance(FRAME_DT).game_over {
            return frame + 1;
        }
    }
    log::info!("Run {} survived {} frames", run, MAX_FRAMES);
    MAX_FRAMES
}
