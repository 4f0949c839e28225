//! Obstacle pair generation
//!
//! A [`Spawner`] decides *when* a pair appears (by elapsed time or by distance
//! scrolled, never a mix of both); [`spawn_pair`] decides *where* the gap goes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Obstacle, ObstacleRole};
use crate::consts::SIM_DT;
use crate::tuning::SpawnPolicy;

/// Shortest distance between pairs, in px
const MIN_SPACING: f32 = 1.0;

/// What the spawner counts toward the next pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnClock {
    /// Elapsed running time (seconds)
    Time,
    /// Total horizontal scroll (px)
    Distance,
}

/// Spawn schedule for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub clock: SpawnClock,
    /// Clock reading at which the next pair is due
    pub next_at: f32,
    /// Clock advance between pairs
    pub step: f32,
    /// Cleared when the run ends; a cancelled spawner never fires again
    pub active: bool,
}

impl Spawner {
    pub fn new(policy: &SpawnPolicy, scroll_speed: f32) -> Self {
        match *policy {
            SpawnPolicy::Timer {
                initial_delay,
                interval,
            } => Self {
                clock: SpawnClock::Time,
                next_at: initial_delay,
                step: interval.max(SIM_DT),
                active: true,
            },
            // The first pair is still scheduled by time, expressed as the
            // distance covered during the delay
            SpawnPolicy::Distance {
                initial_delay,
                spacing,
            } => Self {
                clock: SpawnClock::Distance,
                next_at: initial_delay * scroll_speed,
                step: spacing.max(MIN_SPACING),
                active: true,
            },
        }
    }

    /// Number of pairs due at the given clock readings; advances the schedule
    pub fn due(&mut self, elapsed: f32, scroll: f32) -> u32 {
        if !self.active || self.step <= 0.0 {
            return 0;
        }
        let now = match self.clock {
            SpawnClock::Time => elapsed,
            SpawnClock::Distance => scroll,
        };
        let mut count = 0;
        while now >= self.next_at {
            let next = self.next_at + self.step;
            if next <= self.next_at {
                // Step below float resolution at this reading
                log::warn!("Spawn schedule stalled at {}, cancelling", self.next_at);
                self.cancel();
                break;
            }
            self.next_at = next;
            count += 1;
        }
        count
    }

    /// Stop all future spawns
    pub fn cancel(&mut self) {
        self.active = false;
    }
}

/// Push a top/bottom pair at the right edge of the world
///
/// The gap top is uniform in `[min_gap_top, max_gap_top]`; the gap height is
/// fixed for the whole run.
pub fn spawn_pair(state: &mut GameState) -> u32 {
    let tuning = &state.tuning;
    let gap_top = if tuning.max_gap_top > tuning.min_gap_top {
        state
            .rng
            .random_range(tuning.min_gap_top..=tuning.max_gap_top)
    } else {
        tuning.min_gap_top
    };
    let x = tuning.world_width;
    let width = tuning.pipe_width;
    let gap_height = tuning.gap_height;

    let pair_id = state.next_entity_id();
    for role in [ObstacleRole::Top, ObstacleRole::Bottom] {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            pair_id,
            role,
            x,
            width,
            gap_top,
            gap_height,
            scored: false,
        });
    }

    log::debug!("Spawned pair {} with gap top {:.1}", pair_id, gap_top);
    state.events.push(GameEvent::Spawned { pair_id });
    pair_id
}

/// Run the spawn schedule for the current tick
pub fn update_spawns(state: &mut GameState) {
    let elapsed = state.elapsed_secs() as f32;
    let due = state.spawner.due(elapsed, state.scroll);
    for _ in 0..due {
        spawn_pair(state);
    }
}
