//! Data-driven game balance
//!
//! Every number that shapes how a run "feels" lives here. Revisions of the
//! game differ only in these values, so each one is kept as a named preset.

use serde::{Deserialize, Serialize};

/// How new obstacle pairs are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// First pair after `initial_delay` seconds, then one every `interval` seconds
    Timer { initial_delay: f32, interval: f32 },
    /// First pair after `initial_delay` seconds, then one every `spacing` pixels scrolled
    Distance { initial_delay: f32, spacing: f32 },
}

impl SpawnPolicy {
    /// Seconds between two consecutive pairs at the given scroll speed
    pub fn effective_interval(&self, scroll_speed: f32) -> f32 {
        match *self {
            SpawnPolicy::Timer { interval, .. } => interval,
            SpawnPolicy::Distance { spacing, .. } => {
                if scroll_speed > 0.0 {
                    spacing / scroll_speed
                } else {
                    f32::INFINITY
                }
            }
        }
    }

    /// Delay before the first pair appears
    pub fn initial_delay(&self) -> f32 {
        match *self {
            SpawnPolicy::Timer { initial_delay, .. } => initial_delay,
            SpawnPolicy::Distance { initial_delay, .. } => initial_delay,
        }
    }
}

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TuningPreset {
    /// Original Flappy Bird feel, timer-based pipes
    #[default]
    Classic,
    /// Classic physics, pipes placed at a fixed horizontal spacing
    Spaced,
    /// Softer gravity and a wider gap
    Gentle,
}

impl TuningPreset {
    pub const ALL: [TuningPreset; 3] = [
        TuningPreset::Classic,
        TuningPreset::Spaced,
        TuningPreset::Gentle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TuningPreset::Classic => "Classic",
            TuningPreset::Spaced => "Spaced",
            TuningPreset::Gentle => "Gentle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(TuningPreset::Classic),
            "spaced" => Some(TuningPreset::Spaced),
            "gentle" | "easy" => Some(TuningPreset::Gentle),
            _ => None,
        }
    }

    /// Build the full constant set for this preset
    pub fn tuning(&self) -> Tuning {
        match self {
            TuningPreset::Classic => Tuning::classic(),
            TuningPreset::Spaced => Tuning {
                spawn: SpawnPolicy::Distance {
                    initial_delay: 1.5,
                    spacing: 200.0,
                },
                ..Tuning::classic()
            },
            TuningPreset::Gentle => Tuning {
                gravity: 800.0,
                flap_velocity: -300.0,
                gap_height: 120.0,
                max_gap_top: 300.0,
                scroll_speed: 100.0,
                spawn: SpawnPolicy::Timer {
                    initial_delay: 1.5,
                    interval: 2.0,
                },
                ..Tuning::classic()
            },
        }
    }
}

/// Complete gameplay constant set
///
/// Units are pixels, seconds and degrees. The y axis points down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Top edge of the ground collider
    pub ground_top: f32,
    /// Width of one ground tile (background tiling period)
    pub ground_tile_width: f32,
    /// Bird centre above this is out of bounds
    pub ceiling_limit: f32,
    /// Bird centre below this is out of bounds
    pub floor_limit: f32,

    // === Bird ===
    pub bird_x: f32,
    pub bird_start_y: f32,
    /// Drawn sprite size
    pub sprite_size: [f32; 2],
    /// Collision box, deliberately smaller than the sprite
    pub hitbox_size: [f32; 2],
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Vertical velocity set by a flap (negative = up)
    pub flap_velocity: f32,
    /// Rotation snapped to on flap and held while rising
    pub flap_angle: f32,
    /// Rotation gained per second while falling
    pub dive_rate: f32,
    pub max_dive_angle: f32,

    // === Obstacles ===
    /// Horizontal scroll speed (px/s), shared by pipes and ground
    pub scroll_speed: f32,
    pub pipe_width: f32,
    /// Vertical size of the gap between top and bottom pipe
    pub gap_height: f32,
    pub min_gap_top: f32,
    pub max_gap_top: f32,
    pub spawn: SpawnPolicy,
}

impl Tuning {
    /// Constants of the shipped game
    pub fn classic() -> Self {
        Self {
            world_width: 288.0,
            world_height: 512.0,
            ground_top: 425.0,
            ground_tile_width: 336.0,
            ceiling_limit: 0.0,
            floor_limit: 450.0,

            bird_x: 50.0,
            bird_start_y: 256.0,
            sprite_size: [51.0, 36.0],
            hitbox_size: [26.0, 18.0],
            gravity: 980.0,
            flap_velocity: -320.0,
            flap_angle: -25.0,
            // 3 degrees per frame at 60 fps
            dive_rate: 180.0,
            max_dive_angle: 70.0,

            scroll_speed: 120.0,
            pipe_width: 52.0,
            gap_height: 100.0,
            min_gap_top: 80.0,
            max_gap_top: 320.0,
            spawn: SpawnPolicy::Timer {
                initial_delay: 1.5,
                interval: 1.8,
            },
        }
    }

    /// Seconds between obstacle pairs, as used by score validation
    pub fn spawn_interval(&self) -> f32 {
        self.spawn.effective_interval(self.scroll_speed)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::classic()
    }
}
