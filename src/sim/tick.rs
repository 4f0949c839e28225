//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::{find_collision, update_score};
use super::spawn::update_spawns;
use super::state::{DeathCause, GameEvent, GamePhase, GameState, ObstacleRole};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (click/tap/space)
    pub flap: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Idle | GamePhase::Terminal => return,
        GamePhase::Loading => {
            // First host frame: the run starts on the next tick
            state.phase = GamePhase::Running;
            log::info!("Run started (seed {})", state.seed);
            return;
        }
        GamePhase::Running => {}
    }

    state.time_ticks += 1;

    let flap = input.flap || (input.idle_mode && autopilot_flap(state));
    if flap {
        state.bird.flap(&state.tuning);
        state.events.push(GameEvent::Flapped);
    }

    state.bird.integrate(&state.tuning, dt);

    // Scroll the world
    let dx = state.tuning.scroll_speed * dt;
    state.scroll += dx;
    for obstacle in &mut state.obstacles {
        obstacle.x -= dx;
    }

    update_spawns(state);

    // Score before culling so nothing leaves unscored
    update_score(state);
    state.obstacles.retain(|o| !o.is_offscreen());

    if let Some(cause) = find_collision(&state.bird, &state.obstacles, &state.tuning) {
        terminate(state, cause);
    }

    state.normalize_order();
}

/// End the run
///
/// Only the first call has any effect: it freezes the state, cancels future
/// spawns and records the cause. Returns whether this call ended the run.
pub fn terminate(state: &mut GameState, cause: DeathCause) -> bool {
    if matches!(state.phase, GamePhase::Terminal | GamePhase::Idle) {
        return false;
    }
    state.phase = GamePhase::Terminal;
    state.spawner.cancel();
    state.death = Some(cause);
    state.events.push(GameEvent::Died { cause });
    log::info!(
        "Run over: {:?} with score {} after {:.1}s",
        cause,
        state.score,
        state.elapsed_secs()
    );
    true
}

/// Autopilot decision: flap when falling below the next gap's centre
pub fn autopilot_flap(state: &GameState) -> bool {
    let tuning = &state.tuning;
    let bird = &state.bird;
    let bird_left = bird.pos.x - tuning.hitbox_size[0] * 0.5;

    let target_y = state
        .obstacles
        .iter()
        .filter(|o| o.role == ObstacleRole::Bottom && o.right() >= bird_left)
        .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        .map(|o| o.gap_top + o.gap_height * 0.5)
        .unwrap_or(tuning.bird_start_y);

    // Margin keeps the apex of a flap inside the gap
    bird.vel_y >= 0.0 && bird.pos.y > target_y + tuning.gap_height * 0.15
}
