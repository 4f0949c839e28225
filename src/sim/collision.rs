//! Collision detection and scoring
//!
//! Everything is axis-aligned: the bird hitbox and each pipe segment are
//! boxes, and a run ends on the first overlap or boundary breach.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Bird, DeathCause, GameEvent, GameState, Obstacle, ObstacleRole};
use crate::tuning::Tuning;

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only share an edge do not collide
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Mark obstacles whose trailing edge has passed the bird
///
/// Both halves of a pair get marked, but only the bottom half awards a
/// point, so each pair counts exactly once. Returns the points awarded.
pub fn award_passed(obstacles: &mut [Obstacle], bird_x: f32) -> u32 {
    let mut points = 0;
    for obstacle in obstacles.iter_mut() {
        if obstacle.scored || obstacle.right() >= bird_x {
            continue;
        }
        obstacle.scored = true;
        if obstacle.role == ObstacleRole::Bottom {
            points += 1;
        }
    }
    points
}

/// First thing the bird is touching, if any
pub fn find_collision(bird: &Bird, obstacles: &[Obstacle], tuning: &Tuning) -> Option<DeathCause> {
    if bird.pos.y > tuning.floor_limit || bird.pos.y < tuning.ceiling_limit {
        return Some(DeathCause::OutOfBounds);
    }

    let hitbox = bird.hitbox(tuning);
    if hitbox.max.y >= tuning.ground_top {
        return Some(DeathCause::HitGround);
    }

    obstacles
        .iter()
        .find(|o| hitbox.intersects(&o.bounds(tuning.world_height)))
        .map(|o| DeathCause::HitObstacle { pair_id: o.pair_id })
}

/// Scoring pass for the current tick
pub fn update_score(state: &mut GameState) {
    let points = award_passed(&mut state.obstacles, state.bird.pos.x);
    for _ in 0..points {
        state.score += 1;
        state.events.push(GameEvent::Scored { score: state.score });
        log::debug!("Score: {}", state.score);
    }
}
