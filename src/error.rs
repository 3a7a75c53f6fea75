//! Recoverable error kinds
//!
//! Nothing here is fatal to the process. The only terminal outcome of a match
//! is its designed ended phase.

use thiserror::Error;

/// Raised when a spawn wave cannot place an obstacle in a lane.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("no shape fits inside lane `{lane}`")]
    NoShapeFits { lane: String },
    #[error("no valid placement in lane `{lane}` after {attempts} attempt(s)")]
    NoValidSpawnFound { lane: String, attempts: u32 },
}

/// Raised by a bot strategy that found nowhere safe to stand.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BotError {
    #[error("no safe column on row {row}")]
    NoSafeColumnFound { row: i32 },
}

/// Raised for commands the simulation refuses to apply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown player {0}")]
    UnknownPlayer(usize),
    #[error("bot algorithm {0} is outside 1..=4")]
    InvalidAlgorithm(u8),
}

/// Raised when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
