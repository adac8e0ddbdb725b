//! Simulation errors
//!
//! Every failure here is a programming defect in the caller (bad template,
//! bad delay, broken state machine). Nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid template, step count, scheduler delay or config value
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Internal state the simulation should never reach
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SimError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        SimError::InvariantViolation(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
