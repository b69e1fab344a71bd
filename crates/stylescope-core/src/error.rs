// crates/stylescope-core/src/error.rs

use thiserror::Error;

/// Error types for the StyleScope trajectory pipeline.
#[derive(Debug, Error)]
pub enum StyleScopeError {
    /// Caller-supplied input is malformed (non-positive sizes, bad shapes).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A named real model has no loadable files.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Model files exist but could not be parsed or loaded.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// The real model's forward pass failed.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The real tokenizer failed to encode the input.
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// Layer matrices disagree in shape, or there is nothing to aggregate.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A projection strategy failed to fit.
    #[error("Projection error: {0}")]
    Projection(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used by callers to tell bad input apart from
/// failures on our side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Model,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Model => "model",
            ErrorKind::Internal => "internal",
        }
    }
}

impl StyleScopeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StyleScopeError::Validation(_) => ErrorKind::Validation,
            StyleScopeError::ModelNotFound(_) | StyleScopeError::ModelLoad(_) => ErrorKind::Model,
            StyleScopeError::Inference(_)
            | StyleScopeError::Tokenization(_)
            | StyleScopeError::ShapeMismatch(_)
            | StyleScopeError::Projection(_)
            | StyleScopeError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for StyleScopeError {
    fn from(e: serde_json::Error) -> Self {
        StyleScopeError::Serialization(e.to_string())
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Error> for StyleScopeError {
    fn from(e: candle_core::Error) -> Self {
        StyleScopeError::Inference(e.to_string())
    }
}
