use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use waypoint_core::{ContentKind, Payload, RawOutcome, ResponseRecord};

/// The content kind an outcome will be emitted as: the declared kind when
/// the action fixed one, else the kind implied by its `Content-Type`.
pub fn content_kind(outcome: &RawOutcome) -> ContentKind {
    outcome
        .declared
        .unwrap_or_else(|| ContentKind::from_content_type(outcome.header("content-type")))
}

/// Turn a raw outcome into the canonical wire record.
///
/// The `Content-Type` header is rewritten to the canonical value for the
/// outcome's kind (whatever its original casing); other headers are kept.
/// Structured bodies are serialized here and nowhere earlier; a bare JSON
/// string is emitted unquoted for every kind. Binary bodies are base64
/// encoded and flagged.
///
/// Normalizing a record reopened with `RawOutcome::from` yields the same
/// record.
pub fn normalize(outcome: &RawOutcome) -> ResponseRecord {
    let kind = content_kind(outcome);

    let mut headers: HashMap<String, String> = outcome
        .headers
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("content-type"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    headers.insert("Content-Type".to_owned(), kind.canonical_header().to_owned());

    let (body, is_base64_encoded) = match &outcome.body {
        Payload::Empty => (String::new(), false),
        Payload::Json(serde_json::Value::String(text)) => (text.clone(), false),
        Payload::Json(value) => (value.to_string(), false),
        Payload::Text(text) => (text.clone(), false),
        Payload::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) if !kind.is_binary() => (text.to_owned(), false),
            _ => (STANDARD.encode(bytes), true),
        },
    };

    ResponseRecord {
        status_code: outcome.status_code,
        headers,
        body,
        is_base64_encoded,
    }
}
