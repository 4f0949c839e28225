//! In-process service implementations
//!
//! Handles are cheap clones over shared state, so a test or the demo driver
//! can keep one and inspect what the session wrote.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{Leaderboard, PassRegistry, Payments, ScoreRecord, TransactionId, WalletId};
use crate::error::ServiceError;
use crate::season::{SeasonId, pass_key, score_key};

#[derive(Debug, Default)]
struct LeaderboardData {
    /// Best record per `seasonal-scores/{season}/{wallet}` key
    best: HashMap<String, ScoreRecord>,
    attempts: Vec<ScoreRecord>,
    offline: bool,
}

/// Leaderboard held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    data: Rc<RefCell<LeaderboardData>>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.data.borrow_mut().offline = offline;
    }

    /// Number of best-score entries across all seasons
    pub fn len(&self) -> usize {
        self.data.borrow().best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().best.is_empty()
    }

    pub fn attempts(&self) -> Vec<ScoreRecord> {
        self.data.borrow().attempts.clone()
    }

    fn check_online(&self) -> Result<(), ServiceError> {
        if self.data.borrow().offline {
            Err(ServiceError::Network("leaderboard offline".into()))
        } else {
            Ok(())
        }
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn best_score(&self, season: &SeasonId, wallet: &WalletId) -> Result<Option<ScoreRecord>, ServiceError> {
        self.check_online()?;
        Ok(self.data.borrow().best.get(&score_key(season, wallet)).cloned())
    }

    fn submit_score(&mut self, record: &ScoreRecord) -> Result<(), ServiceError> {
        self.check_online()?;
        let key = score_key(&record.season, &record.wallet);
        self.data.borrow_mut().best.insert(key, record.clone());
        Ok(())
    }

    fn record_attempt(&mut self, record: &ScoreRecord) -> Result<(), ServiceError> {
        self.check_online()?;
        self.data.borrow_mut().attempts.push(record.clone());
        Ok(())
    }

    fn top_scores(&self, season: &SeasonId, limit: usize) -> Result<Vec<ScoreRecord>, ServiceError> {
        self.check_online()?;
        let data = self.data.borrow();
        let mut records: Vec<ScoreRecord> = data
            .best
            .values()
            .filter(|r| r.season == *season)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.timestamp_ms.cmp(&b.timestamp_ms))
        });
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Debug, Default)]
struct PassData {
    passes: HashSet<String>,
    broken: bool,
}

/// Season pass registry held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPasses {
    data: Rc<RefCell<PassData>>,
}

impl MemoryPasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make lookups fail, as with a malformed or unreachable record
    pub fn set_broken(&self, broken: bool) {
        self.data.borrow_mut().broken = broken;
    }

    pub fn insert(&self, season: &SeasonId, wallet: &WalletId) {
        self.data.borrow_mut().passes.insert(pass_key(season, wallet));
    }

    pub fn contains(&self, season: &SeasonId, wallet: &WalletId) -> bool {
        self.data.borrow().passes.contains(&pass_key(season, wallet))
    }
}

impl PassRegistry for MemoryPasses {
    fn has_pass(&self, season: &SeasonId, wallet: &WalletId) -> Result<bool, ServiceError> {
        let data = self.data.borrow();
        if data.broken {
            return Err(ServiceError::Rejected("malformed pass record".into()));
        }
        Ok(data.passes.contains(&pass_key(season, wallet)))
    }

    fn grant_pass(
        &mut self,
        season: &SeasonId,
        wallet: &WalletId,
        _transaction: &TransactionId,
    ) -> Result<(), ServiceError> {
        let mut data = self.data.borrow_mut();
        if data.broken {
            return Err(ServiceError::Unavailable);
        }
        data.passes.insert(pass_key(season, wallet));
        Ok(())
    }
}

/// A settled charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub wallet: WalletId,
    pub lamports: u64,
    pub transaction: TransactionId,
}

#[derive(Debug, Default)]
struct PaymentData {
    charges: Vec<Charge>,
    decline: Option<ServiceError>,
}

/// Payment processor that settles instantly
#[derive(Debug, Clone, Default)]
pub struct MemoryPayments {
    data: Rc<RefCell<PaymentData>>,
}

impl MemoryPayments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every charge with `error` until cleared with `None`
    pub fn set_decline(&self, error: Option<ServiceError>) {
        self.data.borrow_mut().decline = error;
    }

    pub fn charges(&self) -> Vec<Charge> {
        self.data.borrow().charges.clone()
    }
}

impl Payments for MemoryPayments {
    fn charge(&mut self, wallet: &WalletId, lamports: u64) -> Result<TransactionId, ServiceError> {
        let mut data = self.data.borrow_mut();
        if let Some(err) = &data.decline {
            return Err(err.clone());
        }
        let transaction = TransactionId(format!("tx-{}", data.charges.len() + 1));
        data.charges.push(Charge {
            wallet: wallet.clone(),
            lamports,
            transaction: transaction.clone(),
        });
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::SeasonCalendar;
    use chrono::{TimeZone, Utc};

    fn record(wallet: &str, score: u32, minute: u32) -> ScoreRecord {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap();
        ScoreRecord::new(WalletId::new(wallet), score, now, &SeasonCalendar::default())
    }

    #[test]
    fn test_handles_share_state() {
        let board = MemoryLeaderboard::new();
        let mut writer = board.clone();
        writer.submit_score(&record("a", 5, 0)).unwrap();
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_top_scores_ordering() {
        let mut board = MemoryLeaderboard::new();
        board.submit_score(&record("a", 5, 0)).unwrap();
        board.submit_score(&record("b", 9, 1)).unwrap();
        board.submit_score(&record("c", 9, 0)).unwrap();
        board.submit_score(&record("d", 1, 2)).unwrap();

        let season = record("x", 0, 0).season;
        let top = board.top_scores(&season, 3).unwrap();
        let wallets: Vec<&str> = top.iter().map(|r| r.wallet.as_str()).collect();
        // Ties go to the earlier run
        assert_eq!(wallets, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_offline_board_errors() {
        let mut board = MemoryLeaderboard::new();
        board.set_offline(true);
        assert!(board.submit_score(&record("a", 1, 0)).is_err());
        assert!(board.best_score(&record("a", 1, 0).season, &WalletId::new("a")).is_err());
    }

    #[test]
    fn test_pass_grant_and_lookup() {
        let mut passes = MemoryPasses::new();
        let season = record("a", 0, 0).season;
        let wallet = WalletId::new("a");
        assert_eq!(passes.has_pass(&season, &wallet), Ok(false));
        passes
            .grant_pass(&season, &wallet, &TransactionId("tx-1".into()))
            .unwrap();
        assert_eq!(passes.has_pass(&season, &wallet), Ok(true));
    }

    #[test]
    fn test_declined_payment_records_nothing() {
        let mut payments = MemoryPayments::new();
        payments.set_decline(Some(ServiceError::Rejected("insufficient funds".into())));
        assert!(payments.charge(&WalletId::new("a"), 10).is_err());
        assert!(payments.charges().is_empty());

        payments.set_decline(None);
        let tx = payments.charge(&WalletId::new("a"), 10).unwrap();
        assert_eq!(tx, TransactionId("tx-1".into()));
    }
}
