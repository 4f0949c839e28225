//! Save/load of local player statistics
//!
//! Backends:
//! - `MemoryStore`: process lifetime only
//! - `JsonFileStore`: a JSON file on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)
//!
//! A missing or corrupt save loads as empty stats; it never blocks a run.

pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod memory;

pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::stats::LocalStats;

/// Key used by every backend
pub const STATS_KEY: &str = "flappy_foot_stats";

/// Persistent home of [`LocalStats`]
pub trait StatsStore {
    /// Load saved stats, falling back to empty stats
    fn load(&self) -> LocalStats;

    fn save(&mut self, stats: &LocalStats) -> Result<(), StoreError>;
}

/// Decode a saved blob, logging and discarding anything unreadable
pub(crate) fn decode_stats(json: &str) -> LocalStats {
    match serde_json::from_str::<LocalStats>(json) {
        Ok(stats) => {
            log::info!("Loaded stats ({} games played)", stats.total_games);
            stats
        }
        Err(e) => {
            log::warn!("Discarding unreadable stats: {}", e);
            LocalStats::new()
        }
    }
}
