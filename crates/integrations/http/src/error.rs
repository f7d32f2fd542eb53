use std::time::Duration;

use thiserror::Error;
use waypoint_provider::ProviderError;

/// Errors specific to the HTTP runner.
///
/// Converted into [`ProviderError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The descriptor carried no URL.
    #[error("request url missing")]
    MissingUrl,

    /// The request did not complete within its timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// A transport-level error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::MissingUrl => ProviderError::ExecutionFailed(err.to_string()),
            HttpError::Timeout { timeout, .. } => ProviderError::Timeout(timeout),
            HttpError::Http(e) => {
                if e.is_timeout() {
                    ProviderError::Timeout(Duration::ZERO)
                } else if e.is_builder() {
                    ProviderError::ExecutionFailed(e.to_string())
                } else {
                    ProviderError::Connection(e.to_string())
                }
            }
            HttpError::InvalidBody(msg) => ProviderError::Serialization(msg),
        }
    }
}
