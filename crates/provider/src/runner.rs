use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use waypoint_core::{ContentKind, Payload, RawOutcome, RequestSpec};

use crate::error::ProviderError;

/// Response of an outbound HTTP call as delivered by a [`RequestRunner`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body according to the response's `Content-Type`.
    ///
    /// JSON kinds are parsed; a body that does not parse falls back to text,
    /// and bytes that are not UTF-8 stay binary.
    pub fn payload(&self) -> Payload {
        let kind = ContentKind::from_content_type(self.header("content-type"));
        Payload::from_wire(self.body.clone(), kind)
    }
}

impl From<HttpResponse> for RawOutcome {
    /// Only the upstream `Content-Type` is kept; framing headers describe the
    /// upstream body, not the normalized one.
    fn from(response: HttpResponse) -> Self {
        let body = response.payload();
        let mut outcome = RawOutcome::new(response.status_code, body);
        if let Some(content_type) = response.header("content-type") {
            outcome = outcome.with_header("Content-Type", content_type);
        }
        outcome
    }
}

/// Issues outbound HTTP requests.
///
/// This trait is **not** object-safe because it uses native `async fn`. Use
/// [`DynRequestRunner`] for `Arc<dyn ..>` storage; every `RequestRunner`
/// implements it through a blanket implementation.
pub trait RequestRunner: Send + Sync {
    /// Send the request and wait for the full response.
    ///
    /// Non-2xx statuses are returned as responses, not errors. The request's
    /// timeout must be enforced.
    fn send(
        &self,
        request: &RequestSpec,
    ) -> impl std::future::Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

/// Object-safe counterpart of [`RequestRunner`].
#[async_trait]
pub trait DynRequestRunner: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ProviderError>;
}

#[async_trait]
impl<T: RequestRunner + Sync> DynRequestRunner for T {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ProviderError> {
        RequestRunner::send(self, request).await
    }
}
