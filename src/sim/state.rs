//! Game state and core simulation types
//!
//! Everything a single run mutates is owned by [`GameState`]. Nothing here is
//! global: a restart simply builds a fresh state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::spawn::Spawner;
use crate::consts::SIM_DT;
use crate::tuning::Tuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run exists (menu / wallet screen)
    Idle,
    /// Run created, host has not delivered its first frame yet
    Loading,
    /// Active gameplay
    Running,
    /// Run ended; state is frozen
    Terminal,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Bird hitbox touched a pipe of the given pair
    HitObstacle { pair_id: u32 },
    /// Bird hitbox touched the ground collider
    HitGround,
    /// Bird flew above the ceiling or fell below the floor
    OutOfBounds,
    /// Host ended the run (menu, tab closed)
    Abandoned,
}

/// Discrete happenings the host layer reacts to (sound, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Flapped,
    Spawned { pair_id: u32 },
    Scored { score: u32 },
    Died { cause: DeathCause },
}

/// The player's bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Centre position; x never changes during a run
    pub pos: Vec2,
    /// Vertical velocity (px/s, positive = falling)
    pub vel_y: f32,
    /// Rotation in degrees (negative = nose up)
    pub angle: f32,
}

impl Bird {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.bird_x, tuning.bird_start_y),
            vel_y: 0.0,
            angle: 0.0,
        }
    }

    /// Apply a flap impulse: velocity is replaced, not added to
    pub fn flap(&mut self, tuning: &Tuning) {
        self.vel_y = tuning.flap_velocity;
        self.angle = tuning.flap_angle;
    }

    /// Integrate gravity and update rotation for one timestep
    pub fn integrate(&mut self, tuning: &Tuning, dt: f32) {
        self.vel_y += tuning.gravity * dt;
        self.pos.y += self.vel_y * dt;

        if self.vel_y < 0.0 {
            // Rising: hold the nose-up angle
            self.angle = tuning.flap_angle;
        } else {
            self.angle = (self.angle + tuning.dive_rate * dt).min(tuning.max_dive_angle);
        }
    }

    /// Collision box centred on the bird
    pub fn hitbox(&self, tuning: &Tuning) -> Aabb {
        Aabb::from_center(self.pos, Vec2::from(tuning.hitbox_size))
    }
}

/// Which half of a pair an obstacle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleRole {
    Top,
    Bottom,
}

/// One pipe segment. Pairs share `pair_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pair_id: u32,
    pub role: ObstacleRole,
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub gap_top: f32,
    pub gap_height: f32,
    pub scored: bool,
}

impl Obstacle {
    /// Trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap_height
    }

    /// Top pipe spans [0, gap_top], bottom pipe spans [gap_bottom, world_height]
    pub fn bounds(&self, world_height: f32) -> Aabb {
        let (top, bottom) = match self.role {
            ObstacleRole::Top => (0.0, self.gap_top),
            ObstacleRole::Bottom => (self.gap_bottom(), world_height),
        };
        Aabb::new(Vec2::new(self.x, top), Vec2::new(self.right(), bottom))
    }

    /// Fully past the left edge of the viewport
    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gap placement RNG
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub bird: Bird,
    /// Active obstacles, ordered by id
    pub obstacles: Vec<Obstacle>,
    pub spawner: Spawner,
    /// Obstacle pairs passed
    pub score: u32,
    /// Ticks spent in `Running`
    pub time_ticks: u64,
    /// Total horizontal distance scrolled (px)
    pub scroll: f32,
    /// Set once, on the tick that ended the run
    pub death: Option<DeathCause>,
    /// Events produced since the host last drained them
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let spawner = Spawner::new(&tuning.spawn, tuning.scroll_speed);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bird: Bird::new(&tuning),
            tuning,
            phase: GamePhase::Loading,
            obstacles: Vec::new(),
            spawner,
            score: 0,
            time_ticks: 0,
            scroll: 0.0,
            death: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Simulated seconds spent playing
    pub fn elapsed_secs(&self) -> f64 {
        self.time_ticks as f64 * SIM_DT as f64
    }

    /// Ground tiling offset in [0, tile width)
    pub fn ground_offset(&self) -> f32 {
        self.scroll.rem_euclid(self.tuning.ground_tile_width)
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == GamePhase::Terminal
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure obstacles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
    }
}
