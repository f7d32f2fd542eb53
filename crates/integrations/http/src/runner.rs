use std::collections::HashMap;

use bytes::Bytes;
use reqwest::{Client, Method};
use tracing::{debug, instrument, warn};
use waypoint_core::{HttpMethod, Payload, RequestSpec};
use waypoint_provider::{HttpResponse, ProviderError, RequestRunner};

use crate::config::HttpRunnerConfig;
use crate::error::HttpError;

/// [`RequestRunner`] backed by a shared `reqwest` connection pool.
pub struct HttpRequestRunner {
    config: HttpRunnerConfig,
    client: Client,
}

impl HttpRequestRunner {
    /// Build a runner with its own client.
    pub fn new(config: HttpRunnerConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::default()
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;
        Ok(Self { config, client })
    }

    /// Build a runner around an existing client.
    pub fn with_client(config: HttpRunnerConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &HttpRunnerConfig {
        &self.config
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn build_request(&self, spec: &RequestSpec) -> Result<reqwest::RequestBuilder, HttpError> {
        let mut request = self
            .client
            .request(Self::method(spec.method), &spec.url)
            .timeout(spec.timeout);

        if !spec.parameters.is_empty() {
            request = request.query(&spec.parameters);
        }

        let has_header =
            |name: &str| spec.headers.keys().any(|k| k.eq_ignore_ascii_case(name));

        for (key, value) in &self.config.default_headers {
            if !has_header(key) {
                request = request.header(key, value);
            }
        }
        for (key, value) in &spec.headers {
            request = request.header(key, value);
        }

        request = match &spec.body {
            Payload::Empty => request,
            Payload::Json(value) => {
                let body =
                    serde_json::to_vec(value).map_err(|e| HttpError::InvalidBody(e.to_string()))?;
                if !has_header("content-type") {
                    request = request.header("Content-Type", "application/json");
                }
                request.body(body)
            }
            Payload::Text(text) => request.body(text.clone()),
            Payload::Binary(bytes) => request.body(bytes.clone()),
        };
        Ok(request)
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<HttpResponse, HttpError> {
        if spec.url.trim().is_empty() {
            return Err(HttpError::MissingUrl);
        }

        debug!(
            method = spec.method.as_str(),
            url = %spec.url,
            parameters = spec.parameters.len(),
            "sending request"
        );

        let response = self.build_request(spec)?.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(url = %spec.url, "request timed out");
                HttpError::Timeout {
                    url: spec.url.clone(),
                    timeout: spec.timeout,
                }
            } else {
                HttpError::Http(e)
            }
        })?;

        let status_code = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|val| (k.to_string(), val.to_owned())))
            .collect();
        let body: Bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout {
                    url: spec.url.clone(),
                    timeout: spec.timeout,
                }
            } else {
                HttpError::Http(e)
            }
        })?;

        debug!(status_code, size = body.len(), "request completed");

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}

impl RequestRunner for HttpRequestRunner {
    #[instrument(skip(self, request), fields(request = %request.label(), method = %request.method))]
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ProviderError> {
        Ok(self.dispatch(request).await?)
    }
}
