//! Game settings
//!
//! Persisted separately from stats in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::anticheat::DEFAULT_SLACK;
use crate::error::StoreError;
use crate::leaderboard::LAMPORTS_PER_SOL;
use crate::season::{DEFAULT_SEASON_DAYS, SeasonCalendar};
use crate::stats::MAX_HISTORY;
use crate::tuning::{Tuning, TuningPreset};

/// Operator and player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Physics feel
    pub preset: TuningPreset,

    // === Economy ===
    /// Price of a season pass in lamports
    pub entry_fee_lamports: u64,
    /// Season length in days
    pub season_days: u32,

    // === Scoring ===
    /// Extra pairs tolerated above the spawn count
    pub anticheat_slack: u32,
    /// Recent scores kept in local stats
    pub history_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: TuningPreset::Classic,

            // 0.02 SOL
            entry_fee_lamports: LAMPORTS_PER_SOL / 50,
            season_days: DEFAULT_SEASON_DAYS,

            anticheat_slack: DEFAULT_SLACK,
            history_len: MAX_HISTORY,
        }
    }
}

impl Settings {
    /// Create settings from a tuning preset
    pub fn from_preset(preset: TuningPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Constants for the selected preset
    pub fn tuning(&self) -> Tuning {
        self.preset.tuning()
    }

    pub fn calendar(&self) -> SeasonCalendar {
        SeasonCalendar::new(self.season_days)
    }

    /// Entry fee in SOL, for display
    pub fn entry_fee_sol(&self) -> f64 {
        self.entry_fee_lamports as f64 / LAMPORTS_PER_SOL as f64
    }

    /// Parse settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "flappy_foot_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), StoreError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)?;
        let json = self.to_json()?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StoreError::Unavailable)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), StoreError> {
        // No-op for native
        Ok(())
    }
}
