//! Flappy Foot entry point
//!
//! Native builds run a headless demo: an autopilot run against in-memory
//! services followed by a season payout. The browser build goes through
//! `flappy_foot::web::WebGame`, driven by the page's animation loop.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use flappy_foot::consts::SIM_DT;
    use flappy_foot::leaderboard::{Leaderboard, MemoryLeaderboard, MemoryPasses, MemoryPayments, WalletId};
    use flappy_foot::payout::{self, PrizeDistributor, WINNERS};
    use flappy_foot::persistence::JsonFileStore;
    use flappy_foot::platform::{self, SystemClock};
    use flappy_foot::season::SeasonId;
    use flappy_foot::sim::GameEvent;
    use flappy_foot::{GameSession, ServiceError, Services, Settings, TuningPreset, stats};

    struct LoggingDistributor;

    impl PrizeDistributor for LoggingDistributor {
        fn distribute(
            &mut self,
            season: &SeasonId,
            winners: &[WalletId; WINNERS],
        ) -> Result<flappy_foot::leaderboard::TransactionId, ServiceError> {
            log::info!("Distributing {} prize pot to {:?}", season, winners);
            Ok(flappy_foot::leaderboard::TransactionId(format!("payout-{}", season)))
        }
    }

    platform::init_logging();
    log::info!("Flappy Foot (native) starting...");

    // Usage: flappy-foot [seed] [preset]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let preset = args
        .next()
        .and_then(|s| TuningPreset::from_str(&s))
        .unwrap_or_default();

    let board = MemoryLeaderboard::new();
    let services = Services {
        leaderboard: Box::new(board.clone()),
        passes: Box::new(MemoryPasses::new()),
        payments: Box::new(MemoryPayments::new()),
        store: Box::new(JsonFileStore::new(std::env::temp_dir().join("flappy_foot_stats.json"))),
        clock: Box::new(SystemClock),
    };
    let mut session = GameSession::new(Settings::from_preset(preset), services);

    session.connect_wallet(WalletId::new("DemoWa11etAutopi1ot1111111111111111111111111"));
    session.set_idle_mode(true);
    if let Err(e) = session.start_session(seed) {
        log::error!("Could not start: {}", e);
        return;
    }

    // Two minutes of frames at most
    let mut outcome = None;
    for _ in 0..(60 * 120) {
        outcome = session.advance(SIM_DT);
        for event in session.drain_events() {
            if let GameEvent::Scored { score } = event {
                log::debug!("Scored {}", score);
            }
        }
        if outcome.is_some() {
            break;
        }
    }
    let outcome = outcome.or_else(|| session.end_session());

    if let Some(outcome) = outcome {
        println!(
            "Run over after {:.1}s: score {} ({:?}, {:?})",
            outcome.elapsed_secs, outcome.score, outcome.cause, outcome.submission
        );
        println!(
            "Best {} | played {} | {}",
            outcome.stats.best,
            outcome.stats.total_games,
            stats::share_text(outcome.score)
        );
    }

    // Fill the board with a few rivals so the payout has three players
    let season = session.current_season();
    let mut writer = board.clone();
    for (wallet, score) in [("RivalA", 3u32), ("RivalB", 5), ("RivalC", 1)] {
        let record = flappy_foot::leaderboard::ScoreRecord::new(
            WalletId::new(wallet),
            score,
            chrono::Utc::now(),
            &session.settings().calendar(),
        );
        if let Err(e) = writer.submit_score(&record) {
            log::warn!("Could not seed rival score: {}", e);
        }
    }

    match payout::end_season(&board, &mut LoggingDistributor, &season) {
        Ok(result) => {
            for (place, record) in result.winners.iter().enumerate() {
                println!("#{} {} ({} points)", place + 1, record.wallet.short(), record.score);
            }
        }
        Err(e) => println!("No payout: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `flappy_foot::web::start`, this is just to satisfy the compiler
}
