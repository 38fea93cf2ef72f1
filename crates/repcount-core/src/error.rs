//! Error types for the repcount system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Non-finite signal value for {exercise}: {value}")]
    NonFiniteSignal { exercise: String, value: f64 },

    #[error("Signal shape mismatch for {exercise}: {detail}")]
    SignalShape { exercise: String, detail: String },

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
