//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, wallet or network dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, award_passed, find_collision};
pub use spawn::{SpawnClock, Spawner, spawn_pair};
pub use state::{
    Bird, DeathCause, GameEvent, GamePhase, GameState, Obstacle, ObstacleRole,
};
pub use tick::{TickInput, autopilot_flap, terminate, tick};
