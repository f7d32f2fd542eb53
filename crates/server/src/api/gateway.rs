use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::debug;
use waypoint_core::{Event, Fault, HttpMethod, Payload, ResponseRecord};

use super::AppState;

/// Adapt an HTTP request into an [`Event`], dispatch it, and write the
/// resulting record back out.
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = match to_event(&method, &uri, &headers, body) {
        Ok(event) => event,
        Err(fault) => return into_response(&fault.to_response(None)),
    };
    let record = state.dispatcher.handle(&event).await;
    debug!(status_code = record.status_code, "call handled");
    into_response(&record)
}

/// Build the event for a request.
pub fn to_event(method: &Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Result<Event, Fault> {
    let http_method: HttpMethod = method
        .as_str()
        .parse()
        .map_err(|e: waypoint_core::UnsupportedMethod| Fault::BadRequest(e.to_string()))?;

    Ok(Event {
        path: Some(uri.path().to_owned()),
        http_method,
        query_parameters: parse_query(uri.query())?,
        body: Payload::from_bytes(body),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect(),
    })
}

/// Decode a query string: `+` is a space and `%XX` escapes are decoded.
pub fn parse_query(query: Option<&str>) -> Result<HashMap<String, String>, Fault> {
    match query {
        None | Some("") => Ok(HashMap::new()),
        Some(query) => serde_urlencoded::from_str(query)
            .map_err(|e| Fault::BadRequest(format!("query string unparsable: {e}"))),
    }
}

/// Write a record as an HTTP response. Base64 bodies are decoded; headers
/// that are not valid HTTP are dropped.
pub fn into_response(record: &ResponseRecord) -> Response {
    let status = StatusCode::from_u16(record.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Body::from(record.body_bytes())).into_response();
    let target = response.headers_mut();
    for (name, value) in &record.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            target.insert(name, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn query_decoding() {
        let query = parse_query(Some("q=a+b&name=J%C3%A4net&region=eu-west-1")).unwrap();
        assert_eq!(query["q"], "a b");
        assert_eq!(query["name"], "Jänet");
        assert_eq!(query["region"], "eu-west-1");
        assert!(parse_query(None).unwrap().is_empty());
    }

    #[test]
    fn event_from_request() {
        let uri: Uri = "/waypoint/v1/secret?region=us-west-2".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let event = to_event(
            &Method::POST,
            &uri,
            &headers,
            Bytes::from_static(br#"{"k":"v"}"#),
        )
        .unwrap();

        assert_eq!(event.path.as_deref(), Some("/waypoint/v1/secret"));
        assert_eq!(event.http_method, HttpMethod::Post);
        assert_eq!(event.query("region"), Some("us-west-2"));
        assert_eq!(event.header("Content-Type"), Some("application/json"));
        assert_eq!(event.body, Payload::Json(serde_json::json!({"k": "v"})));
    }

    #[test]
    fn unsupported_method_is_rejected() {
        let uri: Uri = "/waypoint/v1/text".parse().unwrap();
        let method = Method::from_bytes(b"BREW").unwrap();
        let err = to_event(&method, &uri, &HeaderMap::new(), Bytes::new()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn base64_record_is_decoded() {
        let mut record = ResponseRecord {
            status_code: 200,
            body: "/9j/4A==".into(),
            is_base64_encoded: true,
            ..ResponseRecord::default()
        };
        record
            .headers
            .insert("Content-Type".into(), "image/jpeg".into());
        let response = into_response(&record);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/jpeg");
    }
}
