//! Game session controller
//!
//! Owns everything a run touches: the wallet, the pass/payment gate, the
//! simulation state, local stats and the hand-off to the leaderboard.
//!
//! ```text
//! Idle --start_session--> Loading --tick--> Running --death/end--> Terminal
//!   ^                                                                 |
//!   +------------------------ return_to_menu -------------------------+
//! ```
//!
//! A run is finished exactly once. Finishing records local stats from the
//! raw score, then validates it and only forwards an accepted score.

use crate::anticheat::{self, Verdict};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{ServiceError, SessionError};
use crate::leaderboard::{Leaderboard, PassRegistry, Payments, ScoreRecord, TransactionId, WalletId};
use crate::persistence::StatsStore;
use crate::platform::Clock;
use crate::season::{SeasonCalendar, SeasonId};
use crate::settings::Settings;
use crate::sim::{DeathCause, GameEvent, GamePhase, GameState, TickInput, terminate, tick};
use crate::stats::LocalStats;
use crate::tuning::Tuning;

/// Longest frame the accumulator accepts, in seconds
const MAX_FRAME_DT: f32 = 0.1;

/// External collaborators a session talks to
pub struct Services {
    pub leaderboard: Box<dyn Leaderboard>,
    pub passes: Box<dyn PassRegistry>,
    pub payments: Box<dyn Payments>,
    pub store: Box<dyn StatsStore>,
    pub clock: Box<dyn Clock>,
}

/// How a run was paid for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Covered by a season pass
    SeasonPass,
    /// Charged the entry fee
    Paid(TransactionId),
}

/// What happened to the score after the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Stored as the wallet's new seasonal best
    NewBest,
    /// Did not beat the stored best; logged as an attempt
    Attempt,
    /// Failed the plausibility check; never sent
    Rejected,
    /// The leaderboard call failed
    Failed(ServiceError),
    /// No wallet paid for this run
    NoWallet,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub score: u32,
    pub elapsed_secs: f64,
    pub cause: Option<DeathCause>,
    pub verdict: Verdict,
    pub submission: Submission,
    /// Whether the run beat the local best
    pub new_local_best: bool,
    /// Stats after recording this run
    pub stats: LocalStats,
}

/// Start/play/end/restart lifecycle around one [`GameState`]
pub struct GameSession {
    services: Services,
    settings: Settings,
    tuning: Tuning,
    calendar: SeasonCalendar,
    stats: LocalStats,
    wallet: Option<WalletId>,
    has_pass: bool,
    /// Wallet that paid for the current run
    run_wallet: Option<WalletId>,
    state: Option<GameState>,
    /// Terminal guard: set once the current run has been finished
    finished: bool,
    input: TickInput,
    accumulator: f32,
    last_outcome: Option<SessionOutcome>,
}

impl GameSession {
    /// Create a session in the Idle state, loading saved stats
    pub fn new(settings: Settings, services: Services) -> Self {
        let stats = services.store.load();
        Self {
            tuning: settings.tuning(),
            calendar: settings.calendar(),
            settings,
            services,
            stats,
            wallet: None,
            has_pass: false,
            run_wallet: None,
            state: None,
            finished: false,
            input: TickInput::default(),
            accumulator: 0.0,
            last_outcome: None,
        }
    }

    // === Wallet ===

    /// Connect a wallet and look up its pass for the current season
    pub fn connect_wallet(&mut self, wallet: WalletId) -> bool {
        log::info!("Wallet connected: {}", wallet.short());
        self.wallet = Some(wallet);
        self.refresh_pass()
    }

    pub fn disconnect_wallet(&mut self) {
        if let Some(wallet) = self.wallet.take() {
            log::info!("Wallet disconnected: {}", wallet.short());
        }
        self.has_pass = false;
    }

    /// Re-check the pass; lookup failures count as no pass
    pub fn refresh_pass(&mut self) -> bool {
        self.has_pass = match &self.wallet {
            Some(wallet) => {
                let season = self.current_season();
                match self.services.passes.has_pass(&season, wallet) {
                    Ok(held) => held,
                    Err(e) => {
                        log::warn!("Pass lookup failed for {}: {}", wallet.short(), e);
                        false
                    }
                }
            }
            None => false,
        };
        self.has_pass
    }

    // === Lifecycle ===

    /// Pay (or use a pass) and create a fresh run
    ///
    /// On error nothing is created and the session stays where it was.
    pub fn start_session(&mut self, seed: u64) -> Result<Entry, SessionError> {
        if self.is_active() {
            return Err(SessionError::SessionActive);
        }
        let wallet = self.wallet.clone().ok_or(SessionError::WalletNotConnected)?;

        let entry = if self.refresh_pass() {
            Entry::SeasonPass
        } else {
            let fee = self.settings.entry_fee_lamports;
            let transaction = self
                .services
                .payments
                .charge(&wallet, fee)
                .map_err(SessionError::PaymentFailed)?;
            log::info!("Charged {} lamports ({})", fee, transaction);

            let season = self.current_season();
            match self.services.passes.grant_pass(&season, &wallet, &transaction) {
                Ok(()) => self.has_pass = true,
                Err(e) => log::warn!("Paid but could not record season pass: {}", e),
            }
            Entry::Paid(transaction)
        };

        self.state = Some(GameState::new(seed, self.tuning.clone()));
        self.run_wallet = Some(wallet);
        self.finished = false;
        self.input = TickInput {
            idle_mode: self.input.idle_mode,
            ..TickInput::default()
        };
        self.accumulator = 0.0;
        self.last_outcome = None;
        log::info!("Session started ({:?})", entry);
        Ok(entry)
    }

    /// Queue a flap for the next tick
    pub fn flap(&mut self) {
        if self.is_active() {
            self.input.flap = true;
        }
    }

    /// Replace the settings between runs; refused while a run is active
    pub fn set_settings(&mut self, settings: Settings) -> bool {
        if self.is_active() {
            return false;
        }
        self.tuning = settings.tuning();
        self.calendar = settings.calendar();
        self.settings = settings;
        true
    }

    /// Let the autopilot play
    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.input.idle_mode = enabled;
    }

    /// Run one fixed step; returns the outcome if the run ended on it
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        let state = self.state.as_mut()?;
        tick(state, &self.input, SIM_DT);

        // Clear one-shot inputs after processing
        self.input.flap = false;

        if state.is_terminal() && !self.finished {
            return Some(self.finish());
        }
        None
    }

    /// Feed one host frame through the fixed-step accumulator
    pub fn advance(&mut self, frame_dt: f32) -> Option<SessionOutcome> {
        if !self.is_active() {
            return None;
        }
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            if let Some(outcome) = self.tick() {
                self.accumulator = 0.0;
                return Some(outcome);
            }
        }

        // Drop backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        None
    }

    /// Abandon the current run, finishing it if that has not happened yet
    ///
    /// Returns the outcome only on the call that finished the run.
    pub fn end_session(&mut self) -> Option<SessionOutcome> {
        let state = self.state.as_mut()?;
        terminate(state, DeathCause::Abandoned);
        if self.finished {
            return None;
        }
        Some(self.finish())
    }

    /// End any run in progress and start another
    pub fn restart(&mut self, seed: u64) -> Result<Entry, SessionError> {
        self.end_session();
        self.start_session(seed)
    }

    /// Drop the run and go back to Idle
    pub fn return_to_menu(&mut self) {
        self.end_session();
        self.state = None;
        self.run_wallet = None;
        self.accumulator = 0.0;
        self.input.flap = false;
    }

    fn finish(&mut self) -> SessionOutcome {
        self.finished = true;
        let (score, elapsed_secs, cause) = match &self.state {
            Some(state) => (state.score, state.elapsed_secs(), state.death),
            None => (0, 0.0, None),
        };

        // Local stats first, from the raw score
        let new_local_best = self.stats.is_new_best(score);
        self.stats.record(score, self.settings.history_len);
        if let Err(e) = self.services.store.save(&self.stats) {
            log::warn!("Could not save stats: {}", e);
        }

        let interval = f64::from(self.tuning.spawn_interval());
        let verdict = anticheat::validate(score, elapsed_secs, interval, self.settings.anticheat_slack);

        let submission = if !verdict.is_accepted() {
            Submission::Rejected
        } else if let Some(wallet) = self.run_wallet.clone() {
            self.submit(wallet, score)
        } else {
            Submission::NoWallet
        };

        let outcome = SessionOutcome {
            score,
            elapsed_secs,
            cause,
            verdict,
            submission,
            new_local_best,
            stats: self.stats.clone(),
        };
        log::info!("Session finished: score {} -> {:?}", score, outcome.submission);
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn submit(&mut self, wallet: WalletId, score: u32) -> Submission {
        let now = self.services.clock.now();
        let record = ScoreRecord::new(wallet, score, now, &self.calendar);
        let leaderboard = &mut self.services.leaderboard;

        let result = match leaderboard.best_score(&record.season, &record.wallet) {
            Ok(Some(best)) if best.score >= score => {
                leaderboard.record_attempt(&record).map(|()| Submission::Attempt)
            }
            Ok(_) => leaderboard.submit_score(&record).map(|()| Submission::NewBest),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            log::error!("Score submission failed: {}", e);
            Submission::Failed(e)
        })
    }

    // === Queries ===

    /// Current phase; Idle when no run exists
    pub fn phase(&self) -> GamePhase {
        self.state.as_ref().map_or(GamePhase::Idle, |s| s.phase)
    }

    /// Whether a run is loading or running
    pub fn is_active(&self) -> bool {
        matches!(self.phase(), GamePhase::Loading | GamePhase::Running)
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn stats(&self) -> &LocalStats {
        &self.stats
    }

    pub fn last_outcome(&self) -> Option<&SessionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn wallet(&self) -> Option<&WalletId> {
        self.wallet.as_ref()
    }

    pub fn has_pass(&self) -> bool {
        self.has_pass
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_season(&self) -> SeasonId {
        self.calendar.current(self.services.clock.now())
    }

    /// Take the events produced by the current run
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state
            .as_mut()
            .map(GameState::drain_events)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{MemoryLeaderboard, MemoryPasses, MemoryPayments};
    use crate::persistence::MemoryStore;
    use crate::platform::FixedClock;
    use crate::tuning::TuningPreset;
    use chrono::{Duration, TimeZone, Utc};

    struct Harness {
        session: GameSession,
        board: MemoryLeaderboard,
        passes: MemoryPasses,
        payments: MemoryPayments,
        store: MemoryStore,
        clock: FixedClock,
    }

    fn harness_with(store: MemoryStore) -> Harness {
        harness_with_settings(Settings::default(), store)
    }

    fn harness_with_settings(settings: Settings, store: MemoryStore) -> Harness {
        let board = MemoryLeaderboard::new();
        let passes = MemoryPasses::new();
        let payments = MemoryPayments::new();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap());
        let services = Services {
            leaderboard: Box::new(board.clone()),
            passes: Box::new(passes.clone()),
            payments: Box::new(payments.clone()),
            store: Box::new(store.clone()),
            clock: Box::new(clock.clone()),
        };
        Harness {
            session: GameSession::new(settings, services),
            board,
            passes,
            payments,
            store,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryStore::new())
    }

    fn wallet() -> WalletId {
        WalletId::new("9euu6jdRP2Uhi3qYihptK3aVLx8Gj1w6R3ALhLjr8XDN")
    }

    /// Start a run and step past the loading frame
    fn running(h: &mut Harness) {
        h.session.connect_wallet(wallet());
        h.session.start_session(42).unwrap();
        h.session.tick();
        assert_eq!(h.session.phase(), GamePhase::Running);
    }

    /// Pretend the run lasted `ticks` and scored `score`
    fn fake_progress(h: &mut Harness, ticks: u64, score: u32) {
        let state = h.session.state.as_mut().unwrap();
        state.time_ticks = ticks;
        state.score = score;
    }

    #[test]
    fn test_start_requires_wallet() {
        let mut h = harness();
        assert_eq!(h.session.start_session(1), Err(SessionError::WalletNotConnected));
        assert_eq!(h.session.phase(), GamePhase::Idle);
        assert!(h.session.state().is_none());
    }

    #[test]
    fn test_failed_payment_creates_nothing() {
        let mut h = harness();
        h.payments
            .set_decline(Some(ServiceError::Rejected("user declined".into())));
        h.session.connect_wallet(wallet());

        let err = h.session.start_session(1).unwrap_err();
        assert_eq!(
            err,
            SessionError::PaymentFailed(ServiceError::Rejected("user declined".into()))
        );
        assert!(h.session.state().is_none());
        assert_eq!(h.session.phase(), GamePhase::Idle);
        assert!(h.payments.charges().is_empty());
        assert!(!h.session.has_pass());
    }

    #[test]
    fn test_payment_grants_season_pass() {
        let mut h = harness();
        h.session.connect_wallet(wallet());

        let entry = h.session.start_session(1).unwrap();
        assert_eq!(entry, Entry::Paid(TransactionId("tx-1".into())));
        assert_eq!(h.payments.charges()[0].lamports, 20_000_000);
        assert!(h.passes.contains(&h.session.current_season(), &wallet()));
        assert!(h.session.has_pass());

        h.session.end_session();
        assert_eq!(h.session.start_session(2).unwrap(), Entry::SeasonPass);
        assert_eq!(h.payments.charges().len(), 1);
    }

    #[test]
    fn test_existing_pass_skips_payment() {
        let mut h = harness();
        let season = SeasonCalendar::default().current(h.clock.now());
        h.passes.insert(&season, &wallet());

        assert!(h.session.connect_wallet(wallet()));
        assert_eq!(h.session.start_session(1).unwrap(), Entry::SeasonPass);
        assert!(h.payments.charges().is_empty());
    }

    #[test]
    fn test_pass_expires_with_season() {
        let mut h = harness();
        h.session.connect_wallet(wallet());
        h.session.start_session(1).unwrap();
        h.session.end_session();

        h.clock.advance(Duration::days(14));
        assert!(matches!(h.session.start_session(2), Ok(Entry::Paid(_))));
        assert_eq!(h.payments.charges().len(), 2);
    }

    #[test]
    fn test_broken_pass_lookup_fails_closed() {
        let mut h = harness();
        h.passes.set_broken(true);

        assert!(!h.session.connect_wallet(wallet()));
        let entry = h.session.start_session(1).unwrap();
        // Charged, and the run starts even though the pass could not be stored
        assert!(matches!(entry, Entry::Paid(_)));
        assert_eq!(h.session.phase(), GamePhase::Loading);
        assert!(!h.session.has_pass());
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut h = harness();
        running(&mut h);
        assert_eq!(h.session.start_session(2), Err(SessionError::SessionActive));
    }

    #[test]
    fn test_ten_second_run_accepted() {
        let mut h = harness();
        running(&mut h);
        fake_progress(&mut h, 600, 5);

        let outcome = h.session.end_session().unwrap();
        assert_eq!(outcome.score, 5);
        assert!((outcome.elapsed_secs - 10.0).abs() < 1e-3);
        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.submission, Submission::NewBest);
        assert_eq!(outcome.cause, Some(DeathCause::Abandoned));

        let season = h.session.current_season();
        let best = h.board.best_score(&season, &wallet()).unwrap().unwrap();
        assert_eq!(best.score, 5);
    }

    #[test]
    fn test_implausible_score_rejected_but_recorded_locally() {
        let mut h = harness();
        running(&mut h);
        fake_progress(&mut h, 600, 9);

        let outcome = h.session.end_session().unwrap();
        assert_eq!(
            outcome.verdict,
            Verdict::Rejected {
                max_plausible: Some(7)
            }
        );
        assert_eq!(outcome.submission, Submission::Rejected);
        assert!(h.board.is_empty());
        assert!(h.board.attempts().is_empty());

        assert_eq!(h.session.phase(), GamePhase::Terminal);
        assert_eq!(h.session.stats().best, 9);
        assert_eq!(h.session.stats().recent, 9);
        assert_eq!(h.store.saved().unwrap().best, 9);
    }

    #[test]
    fn test_end_session_twice_finishes_once() {
        let mut h = harness();
        running(&mut h);
        fake_progress(&mut h, 600, 3);

        assert!(h.session.end_session().is_some());
        let frozen_ticks = h.session.state().unwrap().time_ticks;
        assert!(h.session.end_session().is_none());
        assert!(h.session.tick().is_none());

        assert_eq!(h.session.stats().total_games, 1);
        assert_eq!(h.board.len(), 1);
        assert!(h.board.attempts().is_empty());
        assert_eq!(h.session.state().unwrap().time_ticks, frozen_ticks);
    }

    #[test]
    fn test_lower_score_logged_as_attempt() {
        let mut h = harness();
        running(&mut h);
        fake_progress(&mut h, 600, 6);
        h.session.end_session();

        h.session.start_session(2).unwrap();
        h.session.tick();
        fake_progress(&mut h, 600, 4);
        let outcome = h.session.end_session().unwrap();

        assert_eq!(outcome.submission, Submission::Attempt);
        assert!(!outcome.new_local_best);
        let season = h.session.current_season();
        assert_eq!(h.board.best_score(&season, &wallet()).unwrap().unwrap().score, 6);
        assert_eq!(h.board.attempts().len(), 1);
    }

    #[test]
    fn test_submission_failure_keeps_local_stats() {
        let mut h = harness();
        running(&mut h);
        h.board.set_offline(true);
        fake_progress(&mut h, 600, 5);

        let outcome = h.session.end_session().unwrap();
        assert!(matches!(outcome.submission, Submission::Failed(ServiceError::Network(_))));
        assert!(outcome.new_local_best);
        assert_eq!(h.session.stats().best, 5);
        assert_eq!(h.store.saved().unwrap().total_games, 1);
    }

    #[test]
    fn test_save_failure_does_not_block_outcome() {
        let mut h = harness_with(MemoryStore::read_only());
        running(&mut h);
        fake_progress(&mut h, 600, 2);

        let outcome = h.session.end_session().unwrap();
        assert_eq!(outcome.submission, Submission::NewBest);
        assert_eq!(h.session.stats().total_games, 1);
    }

    #[test]
    fn test_zero_history_setting_keeps_latest_run() {
        let settings = Settings::from_json(r#"{"history_len":0}"#).unwrap();
        let mut h = harness_with_settings(settings, MemoryStore::new());
        running(&mut h);

        let outcome = h.session.end_session().unwrap();
        assert_eq!(outcome.stats.history.front(), Some(&0));
        assert_eq!(h.session.stats().history.len(), 1);
        assert_eq!(h.store.saved().unwrap().history.front(), Some(&0));
    }

    #[test]
    fn test_saved_stats_loaded_on_new() {
        let store = MemoryStore::new();
        let mut saved = LocalStats::new();
        saved.record(11, 10);
        let mut writer = store.clone();
        writer.save(&saved).unwrap();

        let h = harness_with(store);
        assert_eq!(h.session.stats().best, 11);
    }

    #[test]
    fn test_falling_run_ends_on_ground() {
        let mut h = harness();
        h.session.connect_wallet(wallet());
        h.session.start_session(3).unwrap();

        let mut outcome = None;
        for _ in 0..600 {
            outcome = h.session.advance(SIM_DT);
            if outcome.is_some() {
                break;
            }
        }
        let outcome = outcome.expect("bird should hit the ground");
        assert_eq!(outcome.cause, Some(DeathCause::HitGround));
        assert_eq!(outcome.score, 0);
        assert!(outcome.verdict.is_accepted());
        assert_eq!(h.session.phase(), GamePhase::Terminal);
        assert!(h.session.last_outcome().is_some());

        let events = h.session.drain_events();
        assert!(events.contains(&GameEvent::Died {
            cause: DeathCause::HitGround
        }));
        // Nothing more happens after the end
        assert!(h.session.advance(SIM_DT).is_none());
    }

    #[test]
    fn test_autopilot_survives_and_scores() {
        let mut h = harness();
        h.session.connect_wallet(wallet());
        h.session.set_idle_mode(true);
        h.session.start_session(7).unwrap();

        for _ in 0..(60 * 8) {
            if h.session.advance(SIM_DT).is_some() {
                break;
            }
        }
        let state = h.session.state().unwrap();
        assert!(state.time_ticks > 60);
        assert!(state.score >= 1);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut h = harness();
        running(&mut h);
        let before = h.session.state().unwrap().time_ticks;
        h.session.advance(10.0);
        let stepped = h.session.state().unwrap().time_ticks - before;
        assert!(stepped >= 1 && stepped <= u64::from(MAX_SUBSTEPS));
        assert!(h.session.advance(f32::NAN).is_none());
    }

    #[test]
    fn test_flap_waits_for_next_step() {
        let mut h = harness();
        running(&mut h);
        h.session.flap();

        // Too short for a step: the flap stays queued
        h.session.advance(SIM_DT * 0.25);
        assert!(h.session.input.flap);

        h.session.advance(SIM_DT);
        assert!(!h.session.input.flap);
        assert!(h.session.drain_events().contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut h = harness();
        running(&mut h);
        for _ in 0..200 {
            h.session.tick();
        }
        h.session.restart(99).unwrap();

        let state = h.session.state().unwrap();
        assert_eq!(state.phase, GamePhase::Loading);
        assert_eq!(state.seed, 99);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(h.session.stats().total_games, 1);
        assert_eq!(h.payments.charges().len(), 1);
    }

    #[test]
    fn test_settings_change_only_between_runs() {
        let mut h = harness();
        running(&mut h);
        assert!(!h.session.set_settings(Settings::from_preset(TuningPreset::Gentle)));
        assert_eq!(h.session.settings().preset, TuningPreset::Classic);

        h.session.end_session();
        assert!(h.session.set_settings(Settings::from_preset(TuningPreset::Gentle)));
        h.session.start_session(5).unwrap();
        assert_eq!(h.session.state().unwrap().tuning.gap_height, 120.0);
    }

    #[test]
    fn test_return_to_menu_is_idle() {
        let mut h = harness();
        running(&mut h);
        h.session.return_to_menu();
        assert_eq!(h.session.phase(), GamePhase::Idle);
        assert!(h.session.state().is_none());
        assert_eq!(h.session.stats().total_games, 1);
        assert!(h.session.end_session().is_none());
    }

    #[test]
    fn test_score_belongs_to_paying_wallet() {
        let mut h = harness();
        running(&mut h);
        h.session.disconnect_wallet();
        assert!(h.session.wallet().is_none());
        fake_progress(&mut h, 600, 4);

        let outcome = h.session.end_session().unwrap();
        assert_eq!(outcome.submission, Submission::NewBest);
        assert_eq!(h.board.len(), 1);
    }
}
