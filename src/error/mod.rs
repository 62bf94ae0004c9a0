//! Error handling module for MediaMend

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Application-level error type, raised only by setup and command plumbing
#[derive(Error, Debug)]
pub enum MendError {
    /// Configuration file or override could not be used
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Subscriber installation failed
    #[error("Logging error: {message}")]
    LoggingError { message: String },

    /// Progress registry could not be opened
    #[error("Registry error: {message}")]
    RegistryError { message: String },

    /// Input path not found or not of the expected kind
    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Domain error surfaced at the command boundary
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for MediaMend operations
pub type MendResult<T> = std::result::Result<T, MendError>;
