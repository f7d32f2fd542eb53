use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::content::ContentKind;
use crate::error::Fault;

/// A body that has not yet been serialized for the wire.
///
/// Event bodies, descriptor bodies and hop outcomes all travel as a
/// `Payload` so that resolvers can inspect structured JSON between hops.
/// Conversion to a wire string happens only in the normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// A structured JSON value.
    Json(serde_json::Value),
    /// Plain text (also HTML, XML, or an already-serialized wire body).
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
}

impl Payload {
    /// Interpret raw request bytes: JSON when they parse, otherwise text,
    /// otherwise bytes. An empty buffer is [`Payload::Empty`].
    pub fn from_bytes(raw: impl Into<Bytes>) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            return Self::Empty;
        }
        match std::str::from_utf8(&raw) {
            Ok(text) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) => Self::from(value),
                Err(_) => Self::Text(text.to_owned()),
            },
            Err(_) => Self::Binary(raw),
        }
    }

    /// Decode a body whose serialization is known.
    ///
    /// JSON kinds are parsed, falling back to text when the bytes do not
    /// parse. Text kinds stay text. Image kinds and bytes that are not UTF-8
    /// stay binary.
    pub fn from_wire(raw: impl Into<Bytes>, kind: ContentKind) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            return Self::Empty;
        }
        if kind == ContentKind::Json {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&raw) {
                return Self::Json(value);
            }
        }
        match std::str::from_utf8(&raw) {
            Ok(text) if !kind.is_binary() => Self::Text(text.to_owned()),
            _ => Self::Binary(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(value) => value.is_null(),
            Self::Text(text) => text.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
        }
    }

    /// Borrow the structured value, if this payload is JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the text, if this payload is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Look up a value by JSON pointer (e.g. `/data/first_name`).
    pub fn pointer(&self, pointer: &str) -> Option<&serde_json::Value> {
        self.as_json()?.pointer(pointer)
    }

    /// Coerce the payload into a JSON value.
    ///
    /// An empty payload becomes `{}`. Text and bytes must parse as JSON;
    /// otherwise the caller delivered something unusable and the result is a
    /// [`Fault::BadRequest`].
    pub fn to_json(&self) -> Result<serde_json::Value, Fault> {
        let parse = |raw: &[u8]| {
            serde_json::from_slice(raw)
                .map_err(|_| Fault::BadRequest("delivered JSON is not parsable".into()))
        };
        match self {
            Self::Empty => Ok(serde_json::Value::Object(serde_json::Map::new())),
            Self::Json(value) => Ok(value.clone()),
            Self::Text(text) => parse(text.as_bytes()),
            Self::Binary(bytes) => parse(bytes),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<Payload> for serde_json::Value {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Empty => Self::Null,
            Payload::Json(value) => value,
            Payload::Text(text) => Self::String(text),
            Payload::Binary(bytes) => Self::String(STANDARD.encode(bytes)),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}
