//! Request-terminal error kinds. Skipped packets and coerced cells are not errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentinelError {
    /// Empty or unreadable upload, or nothing left to score after defaulting.
    #[error("invalid input: {0}")]
    Input(String),

    /// No scoring model available, or a bad config file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The loaded model failed while scoring.
    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SentinelError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;
