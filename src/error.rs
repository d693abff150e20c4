// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScatterError>;

/// Everything that can abort setup or the start of an iteration.
/// Per-tick animation never produces one of these.
#[derive(Debug, Error)]
pub enum ScatterError {
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("extremal-pair placement needs exactly 2 slots, got {0}")]
    UnsupportedSlotCount(usize),

    #[error("missing constraint: {0}")]
    MissingConstraint(String),

    #[error("invalid constraint for joint '{name}': {reason}")]
    InvalidConstraint { name: String, reason: String },

    #[error("placement needs at least {required} samples, only {available} available")]
    InsufficientSamples { required: usize, available: usize },

    #[error("invalid placement config: {0}")]
    InvalidPlacement(String),

    #[error("iteration {0} is still running; end it before starting another")]
    IterationInProgress(u64),

    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ScatterError {
    fn from(err: serde_json::Error) -> Self {
        ScatterError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ScatterError {
    fn from(err: std::io::Error) -> Self {
        ScatterError::Config(err.to_string())
    }
}
