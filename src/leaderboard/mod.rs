//! Score records and the remote services a run talks to
//!
//! Wallet signing, payment transactions and the realtime database all live
//! outside this crate. The traits here are the narrow seams they plug into;
//! `memory` has single-process implementations for tests and the demo.

pub mod memory;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::season::{SeasonCalendar, SeasonId};

pub use memory::{MemoryLeaderboard, MemoryPasses, MemoryPayments};

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Public address of a player's wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `abcd...wxyz` form for status lines
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return self.0.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signature of a confirmed payment transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One score as stored on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub wallet: WalletId,
    pub score: u32,
    /// Unix time in milliseconds
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub season: SeasonId,
    pub season_end: NaiveDate,
}

impl ScoreRecord {
    /// Record for a run finished at `now`
    pub fn new(wallet: WalletId, score: u32, now: DateTime<Utc>, calendar: &SeasonCalendar) -> Self {
        let season = calendar.current(now);
        let season_end = calendar
            .end_date(&season)
            .unwrap_or_else(|| now.date_naive());
        Self {
            wallet,
            score,
            timestamp_ms: now.timestamp_millis(),
            season,
            season_end,
        }
    }
}

/// Seasonal high-score table
pub trait Leaderboard {
    /// Stored best for this wallet and season
    fn best_score(&self, season: &SeasonId, wallet: &WalletId) -> Result<Option<ScoreRecord>, ServiceError>;

    /// Replace the stored best
    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), ServiceError>;

    /// Log a run that did not beat the best (analytics only)
    fn record_attempt(&mut self, record: &ScoreRecord) -> Result<(), ServiceError>;

    /// Best records of a season, highest first
    fn top_scores(&self, season: &SeasonId, limit: usize) -> Result<Vec<ScoreRecord>, ServiceError>;
}

/// Season pass entitlements
pub trait PassRegistry {
    fn has_pass(&self, season: &SeasonId, wallet: &WalletId) -> Result<bool, ServiceError>;

    fn grant_pass(
        &mut self,
        season: &SeasonId,
        wallet: &WalletId,
        transaction: &TransactionId,
    ) -> Result<(), ServiceError>;
}

/// Wallet payments to the prize treasury
pub trait Payments {
    /// Transfer `lamports` from `wallet`; returns once the transaction is confirmed
    fn charge(&mut self, wallet: &WalletId, lamports: u64) -> Result<TransactionId, ServiceError>;
}
