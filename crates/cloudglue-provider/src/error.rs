//! Provider error types

use cloudglue_core::MapperError;
use std::fmt::Display;
use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unknown resource type: {0}")]
    UnknownType(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{operation}: {message}")]
    Api { operation: String, message: String },

    #[error("{operation}: request throttled: {message}")]
    Throttled { operation: String, message: String },

    #[error("API client unavailable: {0}")]
    ClientUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error("{operation}: unexpected state {state:?} (expected {expected})")]
    UnexpectedState {
        operation: String,
        state: String,
        expected: String,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Annotate an external API failure with the operation being attempted
    pub fn api(operation: impl Into<String>, err: impl Display) -> Self {
        Self::Api {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn throttled(operation: impl Into<String>, err: impl Display) -> Self {
        Self::Throttled {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Throttled { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
