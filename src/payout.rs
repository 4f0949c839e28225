//! End-of-season payout
//!
//! Reads a season's leaderboard, picks the three best distinct wallets and
//! hands them to the prize distributor (an on-chain program call).

use crate::error::{PayoutError, ServiceError};
use crate::leaderboard::{Leaderboard, ScoreRecord, TransactionId, WalletId};
use crate::season::SeasonId;

/// Number of paid places
pub const WINNERS: usize = 3;

/// How many leaderboard rows to read before de-duplicating
const FETCH_LIMIT: usize = 100;

/// Sends the prize pot to the winners, first place first
pub trait PrizeDistributor {
    fn distribute(&mut self, season: &SeasonId, winners: &[WalletId; WINNERS]) -> Result<TransactionId, ServiceError>;
}

/// A completed payout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutOutcome {
    pub season: SeasonId,
    pub winners: [ScoreRecord; WINNERS],
    pub transaction: TransactionId,
}

/// Rank records and keep each wallet's best
///
/// Higher score first; on equal scores the earlier run wins.
pub fn select_winners(records: &[ScoreRecord]) -> Result<[ScoreRecord; WINNERS], PayoutError> {
    let mut ranked: Vec<&ScoreRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.timestamp_ms.cmp(&b.timestamp_ms))
    });

    let mut picked: Vec<ScoreRecord> = Vec::with_capacity(WINNERS);
    for record in ranked {
        if picked.iter().any(|p| p.wallet == record.wallet) {
            continue;
        }
        picked.push(record.clone());
        if picked.len() == WINNERS {
            break;
        }
    }

    let found = picked.len();
    picked
        .try_into()
        .map_err(|_| PayoutError::NotEnoughPlayers { found })
}

/// Pay out one season
pub fn end_season(
    leaderboard: &dyn Leaderboard,
    distributor: &mut dyn PrizeDistributor,
    season: &SeasonId,
) -> Result<PayoutOutcome, PayoutError> {
    let records = leaderboard
        .top_scores(season, FETCH_LIMIT)
        .map_err(PayoutError::Leaderboard)?;
    let winners = select_winners(&records)?;

    let wallets = [
        winners[0].wallet.clone(),
        winners[1].wallet.clone(),
        winners[2].wallet.clone(),
    ];
    let transaction = distributor
        .distribute(season, &wallets)
        .map_err(PayoutError::Distribution)?;

    log::info!(
        "Season {} paid out to {}, {}, {} ({})",
        season,
        wallets[0].short(),
        wallets[1].short(),
        wallets[2].short(),
        transaction
    );
    Ok(PayoutOutcome {
        season: season.clone(),
        winners,
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::MemoryLeaderboard;
    use crate::season::SeasonCalendar;
    use chrono::{TimeZone, Utc};

    fn record(wallet: &str, score: u32, minute: u32) -> ScoreRecord {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, minute, 0).unwrap();
        ScoreRecord::new(WalletId::new(wallet), score, now, &SeasonCalendar::default())
    }

    #[derive(Default)]
    struct RecordingDistributor {
        calls: Vec<[WalletId; WINNERS]>,
        fail: bool,
    }

    impl PrizeDistributor for RecordingDistributor {
        fn distribute(&mut self, _season: &SeasonId, winners: &[WalletId; WINNERS]) -> Result<TransactionId, ServiceError> {
            if self.fail {
                return Err(ServiceError::Rejected("program error".into()));
            }
            self.calls.push(winners.clone());
            Ok(TransactionId(format!("payout-{}", self.calls.len())))
        }
    }

    #[test]
    fn test_select_orders_by_score_then_time() {
        let records = vec![
            record("a", 4, 0),
            record("b", 9, 5),
            record("c", 9, 1),
            record("d", 7, 0),
        ];
        let winners = select_winners(&records).unwrap();
        let wallets: Vec<&str> = winners.iter().map(|r| r.wallet.as_str()).collect();
        assert_eq!(wallets, vec!["c", "b", "d"]);
    }

    #[test]
    fn test_select_distinct_wallets() {
        let records = vec![
            record("a", 10, 0),
            record("a", 8, 1),
            record("b", 6, 2),
            record("c", 5, 3),
        ];
        let winners = select_winners(&records).unwrap();
        let wallets: Vec<&str> = winners.iter().map(|r| r.wallet.as_str()).collect();
        assert_eq!(wallets, vec!["a", "b", "c"]);
        assert_eq!(winners[0].score, 10);
    }

    #[test]
    fn test_select_needs_three_players() {
        let records = vec![record("a", 10, 0), record("a", 3, 1), record("b", 6, 2)];
        assert_eq!(
            select_winners(&records),
            Err(PayoutError::NotEnoughPlayers { found: 2 })
        );
        assert_eq!(
            select_winners(&[]),
            Err(PayoutError::NotEnoughPlayers { found: 0 })
        );
    }

    #[test]
    fn test_end_season_distributes() {
        let mut board = MemoryLeaderboard::new();
        for (wallet, score) in [("a", 3), ("b", 12), ("c", 7), ("d", 1)] {
            board.submit_score(&record(wallet, score, 0)).unwrap();
        }
        let season = record("x", 0, 0).season;
        let mut distributor = RecordingDistributor::default();

        let outcome = end_season(&board, &mut distributor, &season).unwrap();
        assert_eq!(outcome.transaction, TransactionId("payout-1".into()));
        assert_eq!(
            distributor.calls[0],
            [WalletId::new("b"), WalletId::new("c"), WalletId::new("a")]
        );
    }

    #[test]
    fn test_end_season_errors() {
        let mut board = MemoryLeaderboard::new();
        let season = record("x", 0, 0).season;
        let mut distributor = RecordingDistributor::default();

        board.submit_score(&record("a", 3, 0)).unwrap();
        assert!(matches!(
            end_season(&board, &mut distributor, &season),
            Err(PayoutError::NotEnoughPlayers { found: 1 })
        ));

        board.submit_score(&record("b", 3, 0)).unwrap();
        board.submit_score(&record("c", 3, 0)).unwrap();
        distributor.fail = true;
        assert!(matches!(
            end_season(&board, &mut distributor, &season),
            Err(PayoutError::Distribution(_))
        ));
        assert!(distributor.calls.is_empty());

        board.set_offline(true);
        assert!(matches!(
            end_season(&board, &mut distributor, &season),
            Err(PayoutError::Leaderboard(ServiceError::Network(_)))
        ));
    }
}
