use thiserror::Error;
use waypoint_provider::ProviderError;

/// Errors raised while talking to AWS Secrets Manager.
#[derive(Debug, Error)]
pub enum AwsProviderError {
    /// The service returned an error.
    #[error("AWS service error: {0}")]
    ServiceError(String),

    /// The secret does not exist.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The request was throttled.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// The action named a region outside the configured set.
    #[error("region not allowed: {0}")]
    RegionNotAllowed(String),

    /// The stored value is not a JSON object.
    #[error("invalid secret value: {0}")]
    InvalidSecret(String),
}

impl From<AwsProviderError> for ProviderError {
    fn from(err: AwsProviderError) -> Self {
        match err {
            AwsProviderError::NotFound(id) => ProviderError::NotFound(id),
            AwsProviderError::Throttled => ProviderError::Connection(err.to_string()),
            AwsProviderError::Connection(msg) => ProviderError::Connection(msg),
            AwsProviderError::Timeout => {
                ProviderError::Timeout(std::time::Duration::from_secs(30))
            }
            AwsProviderError::InvalidSecret(msg) => ProviderError::Serialization(msg),
            AwsProviderError::RegionNotAllowed(region) => {
                ProviderError::Configuration(format!("region |{region}| not allowed"))
            }
            AwsProviderError::ServiceError(msg) => ProviderError::ExecutionFailed(msg),
        }
    }
}

/// Classify an AWS SDK error message into an [`AwsProviderError`].
pub fn classify_sdk_error(error_str: &str) -> AwsProviderError {
    let lower = error_str.to_lowercase();
    if lower.contains("resourcenotfound") || lower.contains("can't find the specified secret") {
        AwsProviderError::NotFound(error_str.to_owned())
    } else if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many")
    {
        AwsProviderError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsProviderError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        AwsProviderError::Connection(error_str.to_owned())
    } else {
        AwsProviderError::ServiceError(error_str.to_owned())
    }
}
