// crates/stylescope-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group.

pub mod analyze;
pub mod embed;
pub mod node;
pub mod presets;
pub mod probe;
pub mod shuffle;

use stylescope_core::{ErrorKind, StyleScopeError};
use stylescope_probe::ProbeError;
use thiserror::Error;

/// A handler failure, tagged with the category reported to clients.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub kind: ErrorKind,
    pub message: String,
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl From<StyleScopeError> for HandlerError {
    fn from(e: StyleScopeError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl From<ProbeError> for HandlerError {
    fn from(e: ProbeError) -> Self {
        StyleScopeError::Validation(e.to_string()).into()
    }
}

impl From<tokio::task::JoinError> for HandlerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::internal(format!("Worker task failed: {}", e))
    }
}
