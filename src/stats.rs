//! Local player statistics
//!
//! Best, most recent and a short history of scores. Persisted through a
//! [`crate::persistence::StatsStore`], updated once per finished run.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of recent scores to keep
pub const MAX_HISTORY: usize = 10;

/// Aggregate over all finished runs on this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalStats {
    /// Best score ever
    pub best: u32,
    /// Score of the latest run
    pub recent: u32,
    pub total_games: u32,
    /// Latest scores, newest first
    pub history: VecDeque<u32>,
}

impl LocalStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished run in, keeping at most `max_history` entries
    ///
    /// The run just recorded is always kept, even with a zero limit.
    pub fn record(&mut self, score: u32, max_history: usize) {
        self.best = self.best.max(score);
        self.recent = score;
        self.total_games = self.total_games.saturating_add(1);
        self.history.push_front(score);
        self.history.truncate(max_history.max(1));
    }

    /// Whether `score` would set a new personal best
    pub fn is_new_best(&self, score: u32) -> bool {
        score > self.best
    }

    /// Check if no run has been recorded
    pub fn is_empty(&self) -> bool {
        self.total_games == 0
    }

    /// Mean of the kept history
    pub fn average_recent(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        let sum: u64 = self.history.iter().map(|&s| u64::from(s)).sum();
        Some(sum as f32 / self.history.len() as f32)
    }
}

/// Text offered by the share button
pub fn share_text(score: u32) -> String {
    format!(
        "I scored {} points in Flappy Foot! Can you beat my score?",
        score
    )
}
