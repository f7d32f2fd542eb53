use std::sync::Arc;

use tracing::{debug, instrument, warn};
use waypoint_core::{
    Action, ContentKind, DocumentSpec, Fault, Payload, RawOutcome, RequestSpec, ResponseSpec,
    Secret, SecretId, SecretMethod, SecretSpec,
};
use waypoint_provider::{DocumentStore, DynRequestRunner, SecretStore};

/// A secret that a hop wrote successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretWrite {
    pub secret_id: SecretId,
    pub secret: Secret,
}

/// Result of executing one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub outcome: RawOutcome,
    /// Set when the action stored a secret.
    pub written: Option<SecretWrite>,
}

impl From<RawOutcome> for Execution {
    fn from(outcome: RawOutcome) -> Self {
        Self {
            outcome,
            written: None,
        }
    }
}

/// Runs one action against its collaborator.
pub struct ActionExecutor {
    runner: Arc<dyn DynRequestRunner>,
    secrets: Arc<dyn SecretStore>,
    documents: Arc<dyn DocumentStore>,
    allow_secret_writes: bool,
}

impl ActionExecutor {
    pub fn new(
        runner: Arc<dyn DynRequestRunner>,
        secrets: Arc<dyn SecretStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            runner,
            secrets,
            documents,
            allow_secret_writes: false,
        }
    }

    /// Grant or withhold the privilege to write secrets.
    #[must_use]
    pub fn with_secret_writes(mut self, allow: bool) -> Self {
        self.allow_secret_writes = allow;
        self
    }

    /// Execute `action`. Exactly one collaborator is involved per call.
    #[instrument(skip_all, fields(action = action.kind()))]
    pub async fn execute(&self, action: &Action) -> Result<Execution, Fault> {
        match action {
            Action::Request(spec) => self.request(spec).await.map(Execution::from),
            Action::Response(spec) => Ok(Self::response(spec).into()),
            Action::Secret(spec) => self.secret(spec).await,
            Action::Document(spec) => self.document(spec).await.map(Execution::from),
        }
    }

    async fn request(&self, spec: &RequestSpec) -> Result<RawOutcome, Fault> {
        let response = self.runner.send(spec).await.map_err(|e| {
            warn!(request = %spec.label(), error = %e, "outbound request failed");
            Fault::from(e)
        })?;
        debug!(request = %spec.label(), status_code = response.status_code, "outbound request returned");
        Ok(response.into())
    }

    fn response(spec: &ResponseSpec) -> RawOutcome {
        RawOutcome {
            status_code: spec.status_code,
            headers: spec.headers.clone(),
            body: spec.body.clone(),
            declared: spec.content,
        }
    }

    async fn secret(&self, spec: &SecretSpec) -> Result<Execution, Fault> {
        let region = spec.region.as_deref();
        match spec.method {
            SecretMethod::Get => {
                let secret = self
                    .secrets
                    .get(&spec.secret_id, region)
                    .await
                    .ok_or_else(|| {
                        warn!(secret_id = %spec.secret_id, "secret not found");
                        Fault::upstream(format!("secret |{}| not found", spec.secret_id))
                    })?;
                Ok(json_outcome(secret.to_json()).into())
            }
            SecretMethod::Post => {
                if !self.allow_secret_writes {
                    warn!(secret_id = %spec.secret_id, "secret write refused");
                    return Err(Fault::Unauthorized(format!(
                        "not authorized to store secret |{}|",
                        spec.secret_id
                    )));
                }
                let secret = Secret::from_payload(&spec.secret)?;
                let receipt = self
                    .secrets
                    .store(&spec.secret_id, &secret, region)
                    .await
                    .ok_or_else(|| {
                        warn!(secret_id = %spec.secret_id, "secret store returned nothing");
                        Fault::upstream(format!("secret |{}| not stored", spec.secret_id))
                    })?;
                let body = serde_json::json!({
                    "secretId": receipt.secret_id,
                    "version": receipt.version,
                    "stored": true,
                });
                Ok(Execution {
                    outcome: json_outcome(body),
                    written: Some(SecretWrite {
                        secret_id: receipt.secret_id,
                        secret,
                    }),
                })
            }
        }
    }

    async fn document(&self, spec: &DocumentSpec) -> Result<RawOutcome, Fault> {
        let declared = spec.extension().map(ContentKind::from_name).transpose()?;
        let raw = self.documents.get(&spec.path).await.ok_or_else(|| Fault::Upstream {
            status: Some(404),
            message: format!("document |{}| not found", spec.path),
        })?;
        let kind = declared.unwrap_or_default();
        let mut outcome = RawOutcome::new(200, Payload::from_wire(raw, kind));
        outcome.declared = declared;
        Ok(outcome)
    }
}

fn json_outcome(body: serde_json::Value) -> RawOutcome {
    RawOutcome::new(200, Payload::Json(body)).with_declared(ContentKind::Json)
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("allow_secret_writes", &self.allow_secret_writes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use waypoint_core::ImageFormat;
    use waypoint_provider::{
        HttpResponse, MemorySecretStore, ProviderError, RequestRunner, StoreReceipt,
    };

    use super::*;

    struct CannedRunner(Result<HttpResponse, fn() -> ProviderError>);

    impl RequestRunner for CannedRunner {
        async fn send(&self, _request: &RequestSpec) -> Result<HttpResponse, ProviderError> {
            match &self.0 {
                Ok(response) => Ok(response.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Records every write; reads always miss.
    #[derive(Default)]
    struct RecordingStore {
        stores: AtomicUsize,
        last: Mutex<Option<SecretId>>,
    }

    #[async_trait]
    impl SecretStore for RecordingStore {
        async fn get(&self, _id: &SecretId, _region: Option<&str>) -> Option<Secret> {
            None
        }

        async fn store(
            &self,
            secret_id: &SecretId,
            _secret: &Secret,
            _region: Option<&str>,
        ) -> Option<StoreReceipt> {
            self.stores.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(secret_id.clone());
            Some(StoreReceipt {
                secret_id: secret_id.clone(),
                version: None,
            })
        }
    }

    struct StaticDocuments;

    #[async_trait]
    impl DocumentStore for StaticDocuments {
        async fn get(&self, path: &str) -> Option<Bytes> {
            match path {
                "documents/document.json" => Some(Bytes::from_static(br#"{"title":"doc"}"#)),
                "documents/document.jpg" => Some(Bytes::from_static(&[0xff, 0xd8, 0xff])),
                "documents/notes.docx" => Some(Bytes::from_static(b"PK")),
                _ => None,
            }
        }
    }

    fn executor(runner: CannedRunner, secrets: Arc<dyn SecretStore>) -> ActionExecutor {
        ActionExecutor::new(Arc::new(runner), secrets, Arc::new(StaticDocuments))
    }

    fn ok_runner() -> CannedRunner {
        CannedRunner(Ok(HttpResponse::new(200, r#"{"name":"x"}"#)
            .with_header("Content-Type", "application/json")
            .with_header("Content-Length", "12")))
    }

    #[tokio::test]
    async fn request_outcome_keeps_structured_body() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));
        let action = Action::Request(RequestSpec::new("https://example/1"));
        let execution = exec.execute(&action).await.unwrap();
        assert_eq!(
            execution.outcome.body,
            Payload::Json(serde_json::json!({"name": "x"}))
        );
        assert_eq!(execution.outcome.headers.len(), 1);
        assert!(execution.written.is_none());
    }

    #[tokio::test]
    async fn request_failure_becomes_upstream_fault() {
        let runner = CannedRunner(Err(|| ProviderError::Timeout(std::time::Duration::from_secs(7))));
        let exec = executor(runner, Arc::new(MemorySecretStore::new()));
        let err = exec
            .execute(&Action::Request(RequestSpec::new("https://example/1")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 504);
    }

    #[tokio::test]
    async fn response_is_literal() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));
        let spec = ResponseSpec::new(201, "created").with_content_type("text/plain");
        let execution = exec.execute(&Action::Response(spec)).await.unwrap();
        assert_eq!(execution.outcome.status_code, 201);
        assert_eq!(execution.outcome.body, Payload::Text("created".into()));
    }

    #[tokio::test]
    async fn secret_get_returns_json() {
        let store = MemorySecretStore::new()
            .with_secret("common/QA", Secret::new().with_field("user", "qa"));
        let exec = executor(ok_runner(), Arc::new(store));
        let execution = exec
            .execute(&Action::Secret(SecretSpec::get("common/QA")))
            .await
            .unwrap();
        assert_eq!(execution.outcome.declared, Some(ContentKind::Json));
        assert_eq!(execution.outcome.body.pointer("/user"), Some(&serde_json::json!("qa")));
    }

    #[tokio::test]
    async fn secret_get_missing_fails() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));
        let err = exec
            .execute(&Action::Secret(SecretSpec::get("common/QA")))
            .await
            .unwrap_err();
        assert!(matches!(err, Fault::Upstream { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn secret_post_without_privilege_never_stores() {
        let store = Arc::new(RecordingStore::default());
        let exec = executor(ok_runner(), store.clone());
        let err = exec
            .execute(&Action::Secret(SecretSpec::post("common/QA", r#"{"k":"v"}"#)))
            .await
            .unwrap_err();
        assert!(matches!(err, Fault::Unauthorized(_)));
        assert_eq!(err.status_code(), 403);
        assert_eq!(store.stores.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn secret_post_with_privilege_reports_write() {
        let store = Arc::new(RecordingStore::default());
        let exec = executor(ok_runner(), store.clone()).with_secret_writes(true);
        let execution = exec
            .execute(&Action::Secret(SecretSpec::post("common/QA", r#"{"k":"v"}"#)))
            .await
            .unwrap();
        assert_eq!(store.stores.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.last.lock().unwrap().as_ref().map(SecretId::as_str),
            Some("common/QA")
        );
        let written = execution.written.unwrap();
        assert_eq!(written.secret.get("k"), Some(&serde_json::json!("v")));
        assert_eq!(execution.outcome.body.pointer("/stored"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn secret_post_with_unparsable_body_is_bad_request() {
        let store = Arc::new(RecordingStore::default());
        let exec = executor(ok_runner(), store.clone()).with_secret_writes(true);
        let err = exec
            .execute(&Action::Secret(SecretSpec::post("common/QA", "not json")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "delivered JSON is not parsable");
        assert_eq!(store.stores.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn documents_follow_their_extension() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));

        let json = exec
            .execute(&Action::Document(DocumentSpec::new("documents/document.json")))
            .await
            .unwrap();
        assert_eq!(json.outcome.declared, Some(ContentKind::Json));
        assert_eq!(json.outcome.body.pointer("/title"), Some(&serde_json::json!("doc")));

        let jpg = exec
            .execute(&Action::Document(DocumentSpec::new("documents/document.jpg")))
            .await
            .unwrap();
        assert_eq!(jpg.outcome.declared, Some(ContentKind::Image(ImageFormat::Jpeg)));
        assert!(matches!(jpg.outcome.body, Payload::Binary(_)));
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));
        let err = exec
            .execute(&Action::Document(DocumentSpec::new("documents/absent.json")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn unknown_document_extension_is_configuration_fault() {
        let exec = executor(ok_runner(), Arc::new(MemorySecretStore::new()));
        let err = exec
            .execute(&Action::Document(DocumentSpec::new("documents/notes.docx")))
            .await
            .unwrap_err();
        assert!(matches!(err, Fault::Configuration(_)));
        assert!(err.to_string().contains("unrecognized"));
    }
}
