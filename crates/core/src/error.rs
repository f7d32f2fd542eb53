use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::content::ContentKind;
use crate::response::ResponseRecord;
use crate::secret::Secret;

/// A failure raised while routing or executing a call.
///
/// Every fault carries the HTTP status it is reported with; see
/// [`Fault::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A programming or configuration defect: unknown endpoint in a
    /// resolver, unrecognized content type, runaway chain.
    #[error("{0}")]
    Configuration(String),

    /// A descriptor could not be processed.
    #[error("{0}")]
    Unprocessable(String),

    /// No endpoint matches the request path.
    #[error("{0}")]
    NotFound(String),

    /// The endpoint exists but does not accept the request method.
    #[error("|{method}| method not available for |{endpoint}|")]
    MethodNotAllowed { method: String, endpoint: String },

    /// The caller sent a body that cannot be used.
    #[error("{0}")]
    BadRequest(String),

    /// A write action was attempted without privilege.
    #[error("{0}")]
    Unauthorized(String),

    /// An outbound request, secret or document retrieval failed.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl Fault {
    /// Shorthand for an upstream failure without a specific status.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// The HTTP status this fault is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) => 500,
            Self::Unprocessable(_) => 501,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed { .. } | Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 403,
            Self::Upstream { status, .. } => status.unwrap_or(500),
        }
    }

    /// Build the error response for this fault.
    ///
    /// When a secret is supplied, every secret value in the message is
    /// replaced with `SECRET` before it is placed in the body.
    pub fn to_response(&self, secret: Option<&Secret>) -> ResponseRecord {
        let message = self.to_string();
        let message = match secret {
            Some(secret) => secret.scrub(&message),
            None => message,
        };
        let body = ErrorBody {
            code: self.status_code(),
            message,
        };
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_owned(),
            ContentKind::Json.canonical_header().to_owned(),
        );
        ResponseRecord {
            headers,
            body: serde_json::to_string(&body).unwrap_or_default(),
            status_code: body.code,
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Fault::Configuration("x".into()).status_code(), 500);
        assert_eq!(Fault::Unprocessable("x".into()).status_code(), 501);
        assert_eq!(Fault::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            Fault::MethodNotAllowed {
                method: "DELETE".into(),
                endpoint: "text".into()
            }
            .status_code(),
            400
        );
        assert_eq!(Fault::Unauthorized("x".into()).status_code(), 403);
        assert_eq!(Fault::upstream("x").status_code(), 500);
        assert_eq!(
            Fault::Upstream {
                status: Some(504),
                message: "timeout".into()
            }
            .status_code(),
            504
        );
    }

    #[test]
    fn error_response_is_scrubbed_json() {
        let secret = Secret::new().with_field("password", "abc123");
        let fault = Fault::upstream("failed: abc123 invalid");
        let record = fault.to_response(Some(&secret));

        assert_eq!(record.status_code, 500);
        assert_eq!(record.headers["Content-Type"], "text/json");
        let body: serde_json::Value = serde_json::from_str(&record.body).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "failed: SECRET invalid");
    }

    #[test]
    fn method_fault_display() {
        let fault = Fault::MethodNotAllowed {
            method: "DELETE".into(),
            endpoint: "text".into(),
        };
        assert_eq!(fault.to_string(), "|DELETE| method not available for |text|");
    }
}
