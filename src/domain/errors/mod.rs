// Domain errors - Failure taxonomy for repair and merge operations

use thiserror::Error;

/// Domain-specific error types
///
/// Interactors convert most of these into outcomes before they reach a
/// batch loop; one failed file or group never stops the run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// The external tool could not be started or exited non-zero
    #[error("Invocation failed: {0}")]
    InvocationFailure(String),
    /// The Diagnostic Oracle reported a fault
    #[error("Validation fault: {0}")]
    ValidationFault(String),
    /// A filter graph could not be built (missing duration, unknown mode)
    #[error("Graph build failed: {0}")]
    GraphBuildFailure(String),
    /// Inputs no longer satisfy what an earlier stage established
    #[error("Precondition failed: {0}")]
    PreconditionFailure(String),
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Filesystem operation failed
    #[error("Filesystem error: {0}")]
    FsFail(String),
    /// Progress registry could not be read or written
    #[error("Registry error: {0}")]
    Registry(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}
