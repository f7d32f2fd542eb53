use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::content::ContentKind;
use crate::error::Fault;
use crate::method::HttpMethod;
use crate::payload::Payload;
use crate::types::{Continuation, SecretId};

/// Timeout applied to outbound requests that do not set their own.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(7);

const ACTION_KEYS: [&str; 4] = ["request", "response", "secret", "document"];

/// The instruction a resolver produces for one hop of a chain.
///
/// Exactly one [`Action`] is active. A descriptor without a continuation is
/// terminal: the normalized result of its action is the final response.
///
/// The JSON form mirrors the enum layout, e.g.
/// `{"request": {"url": "https://..."}, "continuation": 1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(flatten)]
    pub action: Action,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<Continuation>,
}

/// What the executor must do for a hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Issue an outbound HTTP request.
    Request(RequestSpec),
    /// Return a literal response.
    Response(ResponseSpec),
    /// Read or write a secret.
    Secret(SecretSpec),
    /// Retrieve a static document.
    Document(DocumentSpec),
}

impl Action {
    /// Short tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Secret(_) => "secret",
            Self::Document(_) => "document",
        }
    }
}

impl ActionDescriptor {
    pub fn new(action: impl Into<Action>) -> Self {
        Self {
            action: action.into(),
            continuation: None,
        }
    }

    pub fn request(spec: RequestSpec) -> Self {
        Self::new(spec)
    }

    pub fn response(spec: ResponseSpec) -> Self {
        Self::new(spec)
    }

    pub fn secret(spec: SecretSpec) -> Self {
        Self::new(spec)
    }

    pub fn document(spec: DocumentSpec) -> Self {
        Self::new(spec)
    }

    /// Ask the chain engine to call the resolver again after this hop.
    #[must_use]
    pub fn with_continuation(mut self, continuation: impl Into<Continuation>) -> Self {
        self.continuation = Some(continuation.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.continuation.is_none()
    }

    /// Parse a descriptor from its JSON form.
    ///
    /// A value naming no action, more than one action, or an unknown action
    /// cannot be processed.
    pub fn from_json(value: serde_json::Value) -> Result<Self, Fault> {
        let Some(fields) = value.as_object() else {
            return Err(Fault::Unprocessable(
                "descriptor unprocessable: expected an object".into(),
            ));
        };
        if let Some(unknown) = fields
            .keys()
            .find(|k| *k != "continuation" && !ACTION_KEYS.contains(&k.as_str()))
        {
            return Err(Fault::Unprocessable(format!(
                "descriptor unprocessable: unknown key |{unknown}|"
            )));
        }
        let actions = fields
            .keys()
            .filter(|k| ACTION_KEYS.contains(&k.as_str()))
            .count();
        if actions != 1 {
            return Err(Fault::Unprocessable(format!(
                "descriptor unprocessable: expected exactly one action, found {actions}"
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| Fault::Unprocessable(format!("descriptor unprocessable: {e}")))
    }
}

impl From<RequestSpec> for Action {
    fn from(spec: RequestSpec) -> Self {
        Self::Request(spec)
    }
}

impl From<ResponseSpec> for Action {
    fn from(spec: ResponseSpec) -> Self {
        Self::Response(spec)
    }
}

impl From<SecretSpec> for Action {
    fn from(spec: SecretSpec) -> Self {
        Self::Secret(spec)
    }
}

impl From<DocumentSpec> for Action {
    fn from(spec: DocumentSpec) -> Self {
        Self::Document(spec)
    }
}

/// An outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    /// Label used in logs.
    #[serde(default, rename = "requestName")]
    pub name: Option<String>,

    #[serde(default)]
    pub method: HttpMethod,

    pub url: String,

    /// Query parameters appended to the URL.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub body: Payload,

    #[serde(default = "default_timeout", with = "duration_ms")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl RequestSpec {
    /// A `GET` request to `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: None,
            method: HttpMethod::Get,
            url: url.into(),
            parameters: BTreeMap::new(),
            headers: HashMap::new(),
            body: Payload::Empty,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name for logs: the explicit name, or the URL.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

/// A literal response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub body: Payload,

    #[serde(default = "default_status")]
    pub status_code: u16,

    /// Serialization to use instead of the one implied by the
    /// `Content-Type` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentKind>,
}

fn default_status() -> u16 {
    200
}

impl ResponseSpec {
    pub fn new(status_code: u16, body: impl Into<Payload>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
            status_code,
            content: None,
        }
    }

    /// A `200 OK` response.
    pub fn ok(body: impl Into<Payload>) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    #[must_use]
    pub fn with_content(mut self, content: ContentKind) -> Self {
        self.content = Some(content);
        self
    }
}

/// Direction of a secret-store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecretMethod {
    Get,
    Post,
}

/// A secret-store read or write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {
    pub method: SecretMethod,

    pub secret_id: SecretId,

    /// Value to write; only meaningful for [`SecretMethod::Post`].
    #[serde(default)]
    pub secret: Payload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl SecretSpec {
    pub fn get(secret_id: impl Into<SecretId>) -> Self {
        Self {
            method: SecretMethod::Get,
            secret_id: secret_id.into(),
            secret: Payload::Empty,
            region: None,
        }
    }

    pub fn post(secret_id: impl Into<SecretId>, secret: impl Into<Payload>) -> Self {
        Self {
            method: SecretMethod::Post,
            secret_id: secret_id.into(),
            secret: secret.into(),
            region: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: Option<impl Into<String>>) -> Self {
        self.region = region.map(Into::into);
        self
    }
}

/// A static document lookup, e.g. `documents/logo.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub path: String,
}

impl DocumentSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File extension of the document, if any.
    pub fn extension(&self) -> Option<&str> {
        let file = self.path.rsplit('/').next()?;
        let (stem, ext) = file.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then_some(ext)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
