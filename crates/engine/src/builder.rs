use std::sync::Arc;
use std::time::Duration;

use waypoint_core::{Fault, Secret, SecretId};
use waypoint_provider::{
    DocumentStore, DynRequestRunner, FsDocumentStore, MemorySecretStore, SecretStore,
};

use crate::chain::{ChainEngine, DEFAULT_MAX_HOPS};
use crate::dispatcher::Dispatcher;
use crate::executor::ActionExecutor;
use crate::lifecycle::{DEFAULT_REFRESH_INTERVAL, LifecycleManager, SessionState};
use crate::resolver::ResolverRegistry;

/// Fluent builder for a [`Dispatcher`].
///
/// Only the request runner is required. Secrets default to an empty
/// in-memory store and documents are served from the working directory.
pub struct DispatcherBuilder {
    base_path: String,
    registry: ResolverRegistry,
    runner: Option<Arc<dyn DynRequestRunner>>,
    secrets: Option<Arc<dyn SecretStore>>,
    documents: Option<Arc<dyn DocumentStore>>,
    secret_id: Option<SecretId>,
    initial_secret: Option<Secret>,
    region: Option<String>,
    max_hops: u32,
    refresh_interval: Duration,
    allow_secret_writes: bool,
}

impl DispatcherBuilder {
    /// `base_path` is `{api}/{version}`.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            registry: ResolverRegistry::new(),
            runner: None,
            secrets: None,
            documents: None,
            secret_id: None,
            initial_secret: None,
            region: None,
            max_hops: DEFAULT_MAX_HOPS,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            allow_secret_writes: false,
        }
    }

    /// Set the endpoint table and resolvers.
    #[must_use]
    pub fn registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn runner(mut self, runner: Arc<dyn DynRequestRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    #[must_use]
    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    #[must_use]
    pub fn documents(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Id of the secret this process holds and refreshes.
    #[must_use]
    pub fn secret_id(mut self, secret_id: impl Into<SecretId>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    /// Start with `secret` already loaded; the first refresh happens only
    /// once the refresh interval has passed.
    #[must_use]
    pub fn initial_secret(mut self, secret: Secret) -> Self {
        self.initial_secret = Some(secret);
        self
    }

    /// Region passed to the secret store for the session secret.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    #[must_use]
    pub fn allow_secret_writes(mut self, allow: bool) -> Self {
        self.allow_secret_writes = allow;
        self
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns a configuration fault when no request runner was supplied,
    /// or when an initial secret is given without a secret id.
    pub fn build(self) -> Result<Dispatcher, Fault> {
        let runner = self
            .runner
            .ok_or_else(|| Fault::Configuration("request runner is required".into()))?;
        let secrets = self
            .secrets
            .unwrap_or_else(|| Arc::new(MemorySecretStore::new()));
        let documents = self
            .documents
            .unwrap_or_else(|| Arc::new(FsDocumentStore::new(".")));

        let session = match (self.secret_id, self.initial_secret) {
            (Some(id), Some(secret)) => SessionState::with_secret(id, secret),
            (id, None) => SessionState::new(id),
            (None, Some(_)) => {
                return Err(Fault::Configuration(
                    "initial secret requires a secret id".into(),
                ));
            }
        };

        let executor = ActionExecutor::new(runner, Arc::clone(&secrets), documents)
            .with_secret_writes(self.allow_secret_writes);
        let engine =
            ChainEngine::new(Arc::new(self.registry), executor).with_max_hops(self.max_hops);
        let lifecycle = LifecycleManager::new(secrets)
            .with_refresh_interval(self.refresh_interval)
            .with_region(self.region);

        Ok(Dispatcher::new(
            engine,
            lifecycle,
            Arc::new(session),
            self.base_path.trim_matches('/').to_owned(),
        ))
    }
}
