//! Error types for simulation scheduling.

use thiserror::Error;

/// Errors encountered while driving the tick loop.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Structural edit rejected while running: {what}")]
    EditWhileRunning { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hn_core::HnError> for SimError {
    fn from(e: hn_core::HnError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
