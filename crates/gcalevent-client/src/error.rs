//! Client error types.

use std::fmt;

use gcalevent_core::ValidationError;
use gcalevent_providers::{ManagerError, ProviderError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Invalid command-line usage.
    Usage(String),
    /// The input did not describe a valid event or query.
    Validation(ValidationError),
    /// An event operation failed.
    Manager(ManagerError),
    /// Provider setup failed.
    Provider(ProviderError),
    /// IO error.
    Io(std::io::Error),
    /// Authentication required.
    AuthRequired(String),
    /// Action failed (open, serialize, etc).
    Action(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Usage(msg) => write!(f, "{}", msg),
            Self::Validation(err) => write!(f, "invalid input: {}", err),
            Self::Manager(err) => write!(f, "{}", err),
            Self::Provider(err) => write!(f, "provider error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::Action(msg) => write!(f, "action failed: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Manager(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ManagerError> for ClientError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Validation(err) => Self::Validation(err),
            other => Self::Manager(other),
        }
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}
