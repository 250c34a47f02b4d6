//! Error types for the wakerep engine.
//!
//! Detection-path anomalies (missing joints, degenerate geometry, an
//! uncalibrated range, malformed sensor fields) are not errors: they
//! degrade to "no repetition detected this tick" and never surface
//! here. This enum covers the boundaries where failure is real, such
//! as configuration and the external workout log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: need {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("workout log error: {0}")]
    WorkoutLog(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
