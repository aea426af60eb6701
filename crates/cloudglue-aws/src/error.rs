//! AWS provider error types

use cloudglue_provider::ProviderError;
use thiserror::Error;

/// Errors returned by the AWS API seams
#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("AWS SDK error: {0}")]
    Sdk(String),
}

impl AwsError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound(_))
    }

    /// Convert into a provider error annotated with the operation being attempted
    pub fn context(self, operation: impl Into<String>) -> ProviderError {
        let operation = operation.into();
        match self {
            AwsError::NotFound(message) => ProviderError::NotFound(format!("{operation}: {message}")),
            AwsError::Throttled(message) => ProviderError::throttled(operation, message),
            other => ProviderError::api(operation, other),
        }
    }
}

impl From<AwsError> for ProviderError {
    fn from(err: AwsError) -> Self {
        err.context("calling AWS")
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
