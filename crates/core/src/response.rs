use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The canonical, wire-ready response returned to the caller.
///
/// `body` is always a serialized string; binary bodies are base64 encoded
/// and flagged with `is_base64_encoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status_code: u16,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub body: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl ResponseRecord {
    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The body as bytes, decoding base64 when the record is flagged.
    ///
    /// A flagged body that is not valid base64 is returned verbatim.
    pub fn body_bytes(&self) -> Bytes {
        if self.is_base64_encoded {
            if let Ok(decoded) = STANDARD.decode(&self.body) {
                return Bytes::from(decoded);
            }
        }
        Bytes::from(self.body.clone().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_boundary_shape() {
        let mut record = ResponseRecord {
            status_code: 200,
            body: "hello".into(),
            ..ResponseRecord::default()
        };
        record
            .headers
            .insert("Content-Type".into(), "text/plain".into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "hello");
        assert!(json.get("isBase64Encoded").is_none());

        record.is_base64_encoded = true;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isBase64Encoded"], true);
    }

    #[test]
    fn body_bytes_decodes_flagged_records() {
        let record = ResponseRecord {
            status_code: 200,
            body: "aGk=".into(),
            is_base64_encoded: true,
            ..ResponseRecord::default()
        };
        assert_eq!(record.body_bytes(), Bytes::from_static(b"hi"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut record = ResponseRecord::default();
        record.headers.insert("content-type".into(), "text/xml".into());
        assert_eq!(record.content_type(), Some("text/xml"));
    }
}
