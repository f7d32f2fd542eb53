use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use waypoint_core::{Secret, SecretId};
use waypoint_provider::SecretStore;

/// How long a loaded secret is trusted before it is fetched again.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Snapshot {
    secret: Arc<Secret>,
    last_refresh: Option<Instant>,
}

/// Process-wide state shared by every call: the held secret and when it
/// was last loaded.
///
/// Reads hand out an `Arc` snapshot; writers swap the whole value. Two
/// concurrent refreshes converge on the same fetched value, so the last
/// write simply wins.
#[derive(Debug)]
pub struct SessionState {
    secret_id: Option<SecretId>,
    inner: RwLock<Snapshot>,
}

impl SessionState {
    /// `secret_id` is the secret this process holds; `None` when the
    /// deployment has no secret.
    pub fn new(secret_id: Option<SecretId>) -> Self {
        Self {
            secret_id,
            inner: RwLock::new(Snapshot {
                secret: Arc::new(Secret::new()),
                last_refresh: None,
            }),
        }
    }

    /// Session already holding `secret`, stamped as freshly loaded.
    pub fn with_secret(secret_id: SecretId, secret: Secret) -> Self {
        Self {
            secret_id: Some(secret_id),
            inner: RwLock::new(Snapshot {
                secret: Arc::new(secret),
                last_refresh: Some(Instant::now()),
            }),
        }
    }

    pub fn secret_id(&self) -> Option<&SecretId> {
        self.secret_id.as_ref()
    }

    /// Current secret.
    pub async fn secret(&self) -> Arc<Secret> {
        Arc::clone(&self.inner.read().await.secret)
    }

    pub async fn last_refresh(&self) -> Option<Instant> {
        self.inner.read().await.last_refresh
    }

    /// Replace the held secret without touching the refresh stamp.
    pub async fn replace_secret(&self, secret: Secret) {
        self.inner.write().await.secret = Arc::new(secret);
    }

    async fn install(&self, secret: Option<Secret>, at: Instant) {
        let mut inner = self.inner.write().await;
        if let Some(secret) = secret {
            inner.secret = Arc::new(secret);
        }
        inner.last_refresh = Some(at);
    }
}

/// Decides, once per external call, whether the held secret must be
/// reloaded, and reloads it.
pub struct LifecycleManager {
    store: Arc<dyn SecretStore>,
    refresh_interval: Duration,
    region: Option<String>,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            region: None,
        }
    }

    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Whether a session stamped at `last_refresh` is due for a reload at
    /// `now`.
    pub fn needs_refresh(&self, last_refresh: Option<Instant>, now: Instant) -> bool {
        match last_refresh {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.refresh_interval,
        }
    }

    /// Reload the session secret when it is missing or stale. Returns
    /// `true` when a reload was attempted.
    ///
    /// A failed fetch keeps the previous secret; the session is still
    /// stamped so the store is not hit on every call while it is down.
    pub async fn ensure_fresh(&self, session: &SessionState) -> bool {
        let now = Instant::now();
        if !self.needs_refresh(session.last_refresh().await, now) {
            return false;
        }

        let Some(secret_id) = session.secret_id() else {
            debug!("no session secret configured");
            session.install(None, now).await;
            return true;
        };

        let fetched = self.store.get(secret_id, self.region.as_deref()).await;
        match &fetched {
            Some(secret) => info!(%secret_id, fields = secret.len(), "session secret loaded"),
            None => warn!(%secret_id, "session secret could not be loaded, keeping previous value"),
        }
        session.install(fetched, now).await;
        true
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("refresh_interval", &self.refresh_interval)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use waypoint_provider::{MemorySecretStore, StoreReceipt};

    use super::*;

    /// Counts reads and serves a fixed secret (or nothing).
    struct CountingStore {
        secret: Option<Secret>,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn get(&self, _id: &SecretId, _region: Option<&str>) -> Option<Secret> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.secret.clone()
        }

        async fn store(&self, _: &SecretId, _: &Secret, _: Option<&str>) -> Option<StoreReceipt> {
            None
        }
    }

    fn counting(secret: Option<Secret>) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            secret,
            reads: AtomicUsize::new(0),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn loads_on_first_call_then_waits_for_window() {
        let store = counting(Some(Secret::new().with_field("token", "t1")));
        let manager = LifecycleManager::new(store.clone());
        let session = SessionState::new(Some(SecretId::new("orders/dev")));

        assert!(manager.ensure_fresh(&session).await);
        assert_eq!(session.secret().await.get("token"), Some(&serde_json::json!("t1")));

        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        assert!(!manager.ensure_fresh(&session).await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        assert!(manager.ensure_fresh(&session).await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_secret() {
        let store = counting(None);
        let manager = LifecycleManager::new(store.clone());
        let session = SessionState::with_secret(
            SecretId::new("orders/dev"),
            Secret::new().with_field("token", "old"),
        );

        tokio::time::advance(DEFAULT_REFRESH_INTERVAL + Duration::from_secs(1)).await;
        assert!(manager.ensure_fresh(&session).await);
        assert_eq!(session.secret().await.get("token"), Some(&serde_json::json!("old")));

        assert!(!manager.ensure_fresh(&session).await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn session_without_secret_never_reads_store() {
        let store = counting(Some(Secret::new().with_field("k", "v")));
        let manager = LifecycleManager::new(store.clone());
        let session = SessionState::new(None);

        assert!(manager.ensure_fresh(&session).await);
        assert!(!manager.ensure_fresh(&session).await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert!(session.secret().await.is_empty());
    }

    #[tokio::test]
    async fn replace_secret_is_visible_immediately() {
        let session = SessionState::new(Some(SecretId::new("orders/dev")));
        let before = session.secret().await;
        session
            .replace_secret(Secret::new().with_field("password", "new"))
            .await;
        assert!(before.is_empty());
        assert_eq!(session.secret().await.len(), 1);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = Arc::new(
            MemorySecretStore::new().with_secret("orders/dev", Secret::new().with_field("a", "b")),
        );
        let manager = LifecycleManager::new(store).with_refresh_interval(Duration::from_secs(60));
        let session = SessionState::new(Some(SecretId::new("orders/dev")));
        manager.ensure_fresh(&session).await;
        assert_eq!(session.secret().await.get("a"), Some(&serde_json::json!("b")));
        assert_eq!(manager.refresh_interval(), Duration::from_secs(60));
    }
}
