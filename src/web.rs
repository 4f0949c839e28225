//! Browser host bindings (wasm32 only)
//!
//! The page owns the animation loop and input listeners and calls into
//! [`WebGame`] once per frame. Stats and settings persist in LocalStorage.
//! Leaderboard, pass and payment services are in-process here, so browser
//! runs are local practice until wallet and database bindings exist.

use wasm_bindgen::prelude::*;

use crate::leaderboard::{MemoryLeaderboard, MemoryPasses, MemoryPayments, WalletId};
use crate::persistence::LocalStorageStore;
use crate::platform::{self, SystemClock};
use crate::session::{GameSession, Services};
use crate::settings::Settings;
use crate::sim::{GamePhase, ObstacleRole};
use crate::stats::share_text;
use crate::tuning::TuningPreset;

#[wasm_bindgen(start)]
pub fn start() {
    platform::init_logging();
    log::info!("Flappy Foot (web) starting...");
}

fn browser_services() -> Services {
    Services {
        leaderboard: Box::new(MemoryLeaderboard::new()),
        passes: Box::new(MemoryPasses::new()),
        payments: Box::new(MemoryPayments::new()),
        store: Box::new(LocalStorageStore::new()),
        clock: Box::new(SystemClock),
    }
}

/// Game instance handed to the page
#[wasm_bindgen]
pub struct WebGame {
    session: GameSession,
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        WebGame {
            session: GameSession::new(Settings::load(), browser_services()),
        }
    }

    pub fn connect_wallet(&mut self, address: String) -> bool {
        self.session.connect_wallet(WalletId::new(address))
    }

    pub fn disconnect_wallet(&mut self) {
        self.session.disconnect_wallet();
    }

    /// Start a run; rejects with the error message
    pub fn start_session(&mut self, seed: u32) -> Result<(), JsValue> {
        self.session
            .start_session(u64::from(seed))
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn flap(&mut self) {
        self.session.flap();
    }

    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.session.set_idle_mode(enabled);
    }

    /// Feed one animation frame (seconds); true when the run ended on it
    pub fn advance(&mut self, dt: f32) -> bool {
        self.session.advance(dt).is_some()
    }

    /// Abandon the run; true if this call finished it
    pub fn end_session(&mut self) -> bool {
        self.session.end_session().is_some()
    }

    pub fn return_to_menu(&mut self) {
        self.session.return_to_menu();
    }

    /// Switch tuning preset between runs and persist the choice
    pub fn set_preset(&mut self, name: &str) -> bool {
        let Some(preset) = TuningPreset::from_str(name) else {
            log::warn!("Unknown preset {:?}", name);
            return false;
        };
        let settings = Settings {
            preset,
            ..self.session.settings().clone()
        };
        if !self.session.set_settings(settings.clone()) {
            return false;
        }
        if let Err(e) = settings.save() {
            log::warn!("Could not save settings: {}", e);
        }
        true
    }

    // === Draw data ===

    pub fn phase(&self) -> String {
        match self.session.phase() {
            GamePhase::Idle => "idle",
            GamePhase::Loading => "loading",
            GamePhase::Running => "running",
            GamePhase::Terminal => "terminal",
        }
        .to_string()
    }

    pub fn score(&self) -> u32 {
        self.session.state().map_or(0, |s| s.score)
    }

    pub fn best(&self) -> u32 {
        self.session.stats().best
    }

    pub fn has_pass(&self) -> bool {
        self.session.has_pass()
    }

    pub fn bird_y(&self) -> f32 {
        self.session.state().map_or(0.0, |s| s.bird.pos.y)
    }

    pub fn bird_angle(&self) -> f32 {
        self.session.state().map_or(0.0, |s| s.bird.angle)
    }

    pub fn ground_offset(&self) -> f32 {
        self.session.state().map_or(0.0, |s| s.ground_offset())
    }

    /// `[x, gap_top, gap_bottom]` per pair, flattened
    pub fn pipes(&self) -> Vec<f32> {
        let Some(state) = self.session.state() else {
            return Vec::new();
        };
        state
            .obstacles
            .iter()
            .filter(|o| o.role == ObstacleRole::Bottom)
            .flat_map(|o| [o.x, o.gap_top, o.gap_bottom()])
            .collect()
    }

    pub fn share_text(&self) -> String {
        share_text(self.session.stats().recent)
    }
}
