//! Flappy Foot - A pay-to-play side-scrolling arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions)
//! - `anticheat`: Score plausibility check before submission
//! - `season`: Season calendar and storage keys
//! - `session`: Start/play/end lifecycle around the simulation
//! - `leaderboard`: Score records and remote service seams
//! - `persistence`: Save/load of local stats
//! - `payout`: End-of-season prize selection
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game feel
//! - `web`: Browser host bindings (wasm32)

pub mod anticheat;
pub mod error;
pub mod leaderboard;
pub mod payout;
pub mod persistence;
pub mod platform;
pub mod season;
pub mod session;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{PayoutError, ServiceError, SessionError, StoreError};
pub use session::{Entry, GameSession, Services, SessionOutcome, Submission};
pub use settings::Settings;
pub use stats::LocalStats;
pub use tuning::{Tuning, TuningPreset};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the classic constants were tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
