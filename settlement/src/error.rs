//! Error types for the settlement engine

use crate::types::Position;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a settlement request is rejected before any money is computed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No winning seat designated
    #[error("No winning position selected")]
    NoWinnerSelected,

    /// Win fan absent, negative, or not a multiple of 0.5
    #[error("Win fan must be a non-negative multiple of 0.5")]
    MissingOrInvalidWinFan,

    /// Multiplier tile count negative or out of range
    #[error("Multiplier tile count for {0} must be a non-negative integer")]
    InvalidMultiplierCount(Position),

    /// Bonus fan negative or not a multiple of 0.5
    #[error("Bonus fan for {0} must be a non-negative multiple of 0.5")]
    InvalidBonusFan(Position),

    /// The winner also claimed a bonus fan
    #[error("Winning position cannot claim a bonus fan")]
    WinnerHasBonusFan,
}

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected by the validator
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
