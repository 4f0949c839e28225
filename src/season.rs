//! Seasons: fixed-length calendar windows numbered from the start of each year
//!
//! A season id is a pure function of the date. Passes and leaderboard
//! entries are keyed by it, so a new season resets both.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeasonParseError;
use crate::leaderboard::WalletId;

/// Default season length
pub const DEFAULT_SEASON_DAYS: u32 = 14;

/// Identifies one season, rendered as `{year}-season-{index}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SeasonId {
    pub year: i32,
    /// Zero-based period number within the year
    pub index: u32,
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-season-{}", self.year, self.index)
    }
}

impl FromStr for SeasonId {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, index) = s
            .split_once("-season-")
            .ok_or_else(|| SeasonParseError(s.to_string()))?;
        let year = year.parse().map_err(|_| SeasonParseError(s.to_string()))?;
        let index = index.parse().map_err(|_| SeasonParseError(s.to_string()))?;
        Ok(SeasonId { year, index })
    }
}

impl From<SeasonId> for String {
    fn from(id: SeasonId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SeasonId {
    type Error = SeasonParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Season arithmetic for a given period length (UTC calendar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    period_days: u32,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON_DAYS)
    }
}

impl SeasonCalendar {
    /// A zero-length period is treated as one day
    pub fn new(period_days: u32) -> Self {
        Self {
            period_days: period_days.max(1),
        }
    }

    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    /// Season containing the given date
    pub fn season_of(&self, date: NaiveDate) -> SeasonId {
        SeasonId {
            year: date.year(),
            index: date.ordinal0() / self.period_days,
        }
    }

    /// Season containing the given instant
    pub fn current(&self, now: DateTime<Utc>) -> SeasonId {
        self.season_of(now.date_naive())
    }

    /// First day of the season
    pub fn start_date(&self, season: &SeasonId) -> Option<NaiveDate> {
        let offset = u64::from(season.index) * u64::from(self.period_days);
        NaiveDate::from_ymd_opt(season.year, 1, 1)?.checked_add_days(Days::new(offset))
    }

    /// Start of year + (index + 1) periods; the first day after the season
    ///
    /// The last season of a year may end in the next year.
    pub fn end_date(&self, season: &SeasonId) -> Option<NaiveDate> {
        let offset = (u64::from(season.index) + 1) * u64::from(self.period_days);
        NaiveDate::from_ymd_opt(season.year, 1, 1)?.checked_add_days(Days::new(offset))
    }
}

/// Storage key of a season pass
pub fn pass_key(season: &SeasonId, wallet: &WalletId) -> String {
    format!("season-passes/{}/{}", season, wallet)
}

/// Storage key of a wallet's best score for a season
pub fn score_key(season: &SeasonId, wallet: &WalletId) -> String {
    format!("seasonal-scores/{}/{}", season, wallet)
}
