//! Error types for the navigation engine

use crate::grid::Position;
use thiserror::Error;

/// Navigation engine error type
#[derive(Error, Debug)]
pub enum NavError {
    /// Grid, task or barrier counts cannot be satisfied, or a config/layout is malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Tasks remain but none of them can be reached from the agent's cell
    #[error("No reachable task: {remaining} task(s) remain but none is reachable from {from}")]
    NoReachableTask { remaining: usize, from: Position },

    /// The caller broke an operation's contract (e.g. stepping while idle)
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::InvalidConfiguration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
