//! ### Error
//! Failure taxonomy shared by every module of the crate.

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("chart drawing failed: {0}")]
    Chart(String),

    #[error("bad timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// The dispatch engine failed or handed back something unusable.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("dispatch engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("engine returned {actual} values for {expected} time steps")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("engine returned non-finite value {value} at step {step}")]
    NonFinite { step: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }
}
