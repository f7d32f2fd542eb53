use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Serialize;

use crate::content::ContentKind;
use crate::payload::Payload;
use crate::response::ResponseRecord;
use crate::types::Continuation;

/// What the executor produced for one hop, before normalization.
///
/// The body is still structured; only the normalizer turns it into a wire
/// string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawOutcome {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Payload,
    /// Content kind fixed by the action itself. Takes precedence over the
    /// `Content-Type` header.
    pub declared: Option<ContentKind>,
}

impl RawOutcome {
    pub fn new(status_code: u16, body: impl Into<Payload>) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: body.into(),
            declared: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_declared(mut self, kind: ContentKind) -> Self {
        self.declared = Some(kind);
        self
    }

    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl From<ResponseRecord> for RawOutcome {
    /// Re-open a normalized record. Base64 bodies are decoded back to bytes;
    /// all other bodies are kept as the wire text they already are.
    fn from(record: ResponseRecord) -> Self {
        let body = if record.is_base64_encoded {
            match STANDARD.decode(&record.body) {
                Ok(decoded) => Payload::Binary(Bytes::from(decoded)),
                Err(_) => Payload::Text(record.body),
            }
        } else if record.body.is_empty() {
            Payload::Empty
        } else {
            Payload::Text(record.body)
        };
        Self {
            status_code: record.status_code,
            headers: record.headers,
            body,
            declared: None,
        }
    }
}

/// The previous hop, handed to the resolver on the next call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainState {
    /// Marker the previous descriptor carried.
    pub continuation: Continuation,
    /// Number of hops already run (1 on the second resolver call).
    pub hop: u32,
    /// Normalized record of the previous hop.
    pub response: ResponseRecord,
    /// The previous hop's body before serialization.
    pub payload: Payload,
}

impl ChainState {
    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }

    /// Look up a field of a JSON body by pointer (e.g. `/data/first_name`).
    pub fn pointer(&self, pointer: &str) -> Option<&serde_json::Value> {
        self.payload.pointer(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopens_plain_record_as_text() {
        let record = ResponseRecord {
            status_code: 201,
            body: r#"{"message":"ok"}"#.into(),
            ..ResponseRecord::default()
        };
        let outcome = RawOutcome::from(record);
        assert_eq!(outcome.status_code, 201);
        assert_eq!(outcome.body, Payload::Text(r#"{"message":"ok"}"#.into()));
    }

    #[test]
    fn reopens_base64_record_as_bytes() {
        let record = ResponseRecord {
            status_code: 200,
            body: "aGk=".into(),
            is_base64_encoded: true,
            ..ResponseRecord::default()
        };
        let outcome = RawOutcome::from(record);
        assert_eq!(outcome.body, Payload::Binary(Bytes::from_static(b"hi")));
    }

    #[test]
    fn chain_state_pointer() {
        let state = ChainState {
            continuation: Continuation::new(1),
            hop: 1,
            response: ResponseRecord::default(),
            payload: Payload::Json(serde_json::json!({"data": {"first_name": "Janet"}})),
        };
        assert_eq!(
            state.pointer("/data/first_name"),
            Some(&serde_json::json!("Janet"))
        );
    }
}
