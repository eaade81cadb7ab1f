//! Centralized error types for Mathscribe.

use thiserror::Error;

/// Main error type for the recognition pipeline.
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Invalid image payload: {0}")]
    Decode(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model answered, but not with the expected JSON array.
    #[error("Failed to parse AI response.")]
    Parse { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations.
pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a model unavailable error.
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a parse error carrying the underlying reason for logs.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}
