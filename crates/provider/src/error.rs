use std::time::Duration;

use thiserror::Error;
use waypoint_core::Fault;

/// Errors raised by a collaborator (request runner, secret store,
/// document store).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The collaborator failed to carry out the operation.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The collaborator did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The collaborator was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<ProviderError> for Fault {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Configuration(msg) => Self::Configuration(msg),
            ProviderError::Timeout(_) => Self::Upstream {
                status: Some(504),
                message: err.to_string(),
            },
            other => Self::upstream(other.to_string()),
        }
    }
}
