//! Error types

use std::fmt;

/// Failure reported by an external collaborator (wallet, payment, database)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport failed or timed out
    Network(String),
    /// The remote side refused the request (declined payment, bad signature)
    Rejected(String),
    /// The collaborator is not reachable at all (no wallet extension, offline)
    Unavailable,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "network error: {}", msg),
            ServiceError::Rejected(msg) => write!(f, "request rejected: {}", msg),
            ServiceError::Unavailable => write!(f, "service unavailable"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Why a run could not be started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    WalletNotConnected,
    /// A run is already in progress
    SessionActive,
    PaymentFailed(ServiceError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::WalletNotConnected => write!(f, "please connect your wallet first"),
            SessionError::SessionActive => write!(f, "a game is already running"),
            SessionError::PaymentFailed(e) => write!(f, "payment failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::PaymentFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Local stats persistence failure
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    /// Backing storage does not exist on this platform
    Unavailable,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O error: {}", e),
            StoreError::Serialize(e) => write!(f, "could not encode stats: {}", e),
            StoreError::Unavailable => write!(f, "storage unavailable"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialize(e) => Some(e),
            StoreError::Unavailable => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e)
    }
}

/// Malformed season identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonParseError(pub String);

impl fmt::Display for SeasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid season id {:?}", self.0)
    }
}

impl std::error::Error for SeasonParseError {}

/// Season payout failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// Fewer than three distinct wallets scored this season
    NotEnoughPlayers { found: usize },
    Leaderboard(ServiceError),
    Distribution(ServiceError),
}

impl fmt::Display for PayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoutError::NotEnoughPlayers { found } => {
                write!(f, "not enough players ({} of 3)", found)
            }
            PayoutError::Leaderboard(e) => write!(f, "could not read leaderboard: {}", e),
            PayoutError::Distribution(e) => write!(f, "prize distribution failed: {}", e),
        }
    }
}

impl std::error::Error for PayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PayoutError::Leaderboard(e) | PayoutError::Distribution(e) => Some(e),
            PayoutError::NotEnoughPlayers { .. } => None,
        }
    }
}
