use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Fault;
use crate::payload::Payload;

/// Replacement text for scrubbed secret values.
pub const SCRUBBED: &str = "SECRET";

/// An opaque mapping of credential fields.
///
/// The `Debug` implementation never prints values. Use [`Secret::scrub`]
/// before any text that might contain a credential leaves the process.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(serde_json::Map<String, serde_json::Value>);

impl Secret {
    /// Create an empty secret.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Build a secret from a JSON value, which must be an object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, Fault> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(Fault::BadRequest(format!(
                "secret must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build a secret from a request body.
    pub fn from_payload(payload: &Payload) -> Result<Self, Fault> {
        Self::from_json(payload.to_json()?)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The secret as a JSON object value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.0.clone())
    }

    /// Replace every occurrence of every string value held in this secret
    /// with [`SCRUBBED`].
    ///
    /// Nested objects and arrays are searched too. Longer values are
    /// replaced first so that a value containing another value is never
    /// half-scrubbed.
    pub fn scrub(&self, text: &str) -> String {
        let mut values = Vec::new();
        for value in self.0.values() {
            collect_strings(value, &mut values);
        }
        values.sort_by_key(|v| std::cmp::Reverse(v.len()));

        let mut scrubbed = text.to_owned();
        for value in values {
            if scrubbed.contains(value) {
                scrubbed = scrubbed.replace(value, SCRUBBED);
            }
        }
        scrubbed
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.0.keys() {
            map.entry(key, &"[REDACTED]");
        }
        map.finish()
    }
}

fn collect_strings<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => out.push(s),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_strings(item, out);
            }
        }
        _ => {}
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
