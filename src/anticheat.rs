//! Score plausibility check
//!
//! A run cannot pass more pairs than were spawned. With one pair per spawn
//! interval the ceiling is `floor(elapsed / interval) + slack`, where the
//! slack absorbs the startup delay.

use serde::{Deserialize, Serialize};

/// Default tolerance added to the spawn-count ceiling
pub const DEFAULT_SLACK: u32 = 2;

/// Outcome of a plausibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    /// `max_plausible` is `None` when the inputs themselves were unusable
    Rejected { max_plausible: Option<u32> },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Highest score reachable in `elapsed_secs` at one pair per `interval_secs`
///
/// Returns `None` for negative, NaN or infinite elapsed time and for a
/// non-positive interval.
pub fn max_plausible_score(elapsed_secs: f64, interval_secs: f64, slack: u32) -> Option<u32> {
    if !elapsed_secs.is_finite() || elapsed_secs < 0.0 {
        return None;
    }
    if !interval_secs.is_finite() || interval_secs <= 0.0 {
        return None;
    }
    let spawned = (elapsed_secs / interval_secs).floor();
    // Saturate instead of wrapping for absurdly long runs
    let spawned = if spawned >= u32::MAX as f64 {
        u32::MAX
    } else {
        spawned as u32
    };
    Some(spawned.saturating_add(slack))
}

/// Accept iff `score <= floor(elapsed / interval) + slack`
pub fn validate(score: u32, elapsed_secs: f64, interval_secs: f64, slack: u32) -> Verdict {
    match max_plausible_score(elapsed_secs, interval_secs, slack) {
        Some(max) if score <= max => Verdict::Accepted,
        max_plausible => {
            log::warn!(
                "Rejected score {} (elapsed {:.2}s, interval {:.2}s, ceiling {:?})",
                score,
                elapsed_secs,
                interval_secs,
                max_plausible
            );
            Verdict::Rejected { max_plausible }
        }
    }
}
