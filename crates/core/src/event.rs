use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::method::HttpMethod;
use crate::payload::Payload;

/// An inbound call, normalized by the listener that received it.
///
/// Serializes using the API-gateway proxy field names (`httpMethod`,
/// `queryStringParameters`) so that captured events can be replayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Request path (e.g. `/orders/v1/next1`). `None` when the front-end
    /// did not supply one.
    #[serde(default)]
    pub path: Option<String>,

    /// HTTP method of the call.
    pub http_method: HttpMethod,

    /// Decoded query-string parameters.
    #[serde(
        default,
        rename = "queryStringParameters",
        alias = "queryParameters",
        deserialize_with = "null_as_default"
    )]
    pub query_parameters: HashMap<String, String>,

    /// Request body.
    #[serde(default)]
    pub body: Payload,

    /// Request headers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
}

impl Event {
    /// Create an event for the given method and path with no body.
    #[must_use]
    pub fn new(http_method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            http_method,
            ..Self::default()
        }
    }

    /// Add a query-string parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(key.into(), value.into());
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a query-string parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_parameters.get(key).map(String::as_str)
    }

    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
