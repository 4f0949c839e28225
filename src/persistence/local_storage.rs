//! Browser LocalStorage stats store (wasm32 only)

use super::{STATS_KEY, StatsStore, decode_stats};
use crate::error::StoreError;
use crate::stats::LocalStats;

/// Stats kept in `window.localStorage`
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl StatsStore for LocalStorageStore {
    fn load(&self) -> LocalStats {
        if let Some(storage) = Self::storage() {
            if let Ok(Some(json)) = storage.get_item(STATS_KEY) {
                return decode_stats(&json);
            }
        }
        log::info!("No stats found, starting fresh");
        LocalStats::new()
    }

    fn save(&mut self, stats: &LocalStats) -> Result<(), StoreError> {
        let storage = Self::storage().ok_or(StoreError::Unavailable)?;
        let json = serde_json::to_string(stats)?;
        storage
            .set_item(STATS_KEY, &json)
            .map_err(|_| StoreError::Unavailable)?;
        log::info!("Stats saved ({} games)", stats.total_games);
        Ok(())
    }
}
