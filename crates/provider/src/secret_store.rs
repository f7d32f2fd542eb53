use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use waypoint_core::{Secret, SecretId};

/// Confirmation of a successful secret write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt {
    pub secret_id: SecretId,
    /// Version identifier assigned by the backend, when it has one.
    pub version: Option<String>,
}

/// Reads and writes secrets.
///
/// Implementations never fail loudly: a missing secret or a backend error
/// is reported as `None` and logged by the implementation.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret. `region` selects the backend region when the
    /// backend is regional.
    async fn get(&self, secret_id: &SecretId, region: Option<&str>) -> Option<Secret>;

    /// Replace the value of a secret.
    async fn store(
        &self,
        secret_id: &SecretId,
        secret: &Secret,
        region: Option<&str>,
    ) -> Option<StoreReceipt>;
}

/// Process-local secret store.
///
/// Regions are ignored. Useful for local runs and tests.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: DashMap<SecretId, Secret>,
    version: AtomicU64,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a secret.
    #[must_use]
    pub fn with_secret(self, secret_id: impl Into<SecretId>, secret: Secret) -> Self {
        self.secrets.insert(secret_id.into(), secret);
        self
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, secret_id: &SecretId, _region: Option<&str>) -> Option<Secret> {
        let secret = self.secrets.get(secret_id).map(|s| s.value().clone());
        if secret.is_none() {
            debug!(%secret_id, "secret not present in memory store");
        }
        secret
    }

    async fn store(
        &self,
        secret_id: &SecretId,
        secret: &Secret,
        _region: Option<&str>,
    ) -> Option<StoreReceipt> {
        self.secrets.insert(secret_id.clone(), secret.clone());
        let version = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        Some(StoreReceipt {
            secret_id: secret_id.clone(),
            version: Some(version.to_string()),
        })
    }
}
