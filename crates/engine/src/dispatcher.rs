use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, instrument, warn};
use waypoint_core::{Event, Fault, ResponseRecord};

use crate::chain::ChainEngine;
use crate::lifecycle::{LifecycleManager, SessionState};
use crate::router::{Endpoint, resolve_endpoint_name};

/// The per-call boundary: refresh, route, run the chain, and turn any
/// fault into an error response.
#[derive(Debug)]
pub struct Dispatcher {
    engine: ChainEngine,
    lifecycle: LifecycleManager,
    session: Arc<SessionState>,
    base_path: String,
}

impl Dispatcher {
    pub(crate) fn new(
        engine: ChainEngine,
        lifecycle: LifecycleManager,
        session: Arc<SessionState>,
        base_path: String,
    ) -> Self {
        Self {
            engine,
            lifecycle,
            session,
            base_path,
        }
    }

    /// `{api}/{version}` prefix the router matches against.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        self.engine.registry().endpoints()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Handle one external call. Never fails: every fault, and a resolver
    /// that panics, is turned into an error response.
    #[instrument(skip_all, fields(method = %event.http_method, path = event.path.as_deref().unwrap_or("")))]
    pub async fn handle(&self, event: &Event) -> ResponseRecord {
        self.lifecycle.ensure_fresh(&self.session).await;

        let result = match resolve_endpoint_name(event, &self.base_path, self.engine.registry().endpoints()) {
            Ok(endpoint) => AssertUnwindSafe(self.engine.run(event, &self.session, &endpoint))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!(%endpoint, "chain aborted");
                    Err(Fault::Unprocessable("response not processed".into()))
                }),
            Err(fault) => Err(fault),
        };

        match result {
            Ok(response) => response,
            Err(fault) => {
                let secret = self.session.secret().await;
                let response = fault.to_response(Some(&secret));
                if fault.status_code() == 500 {
                    let event_json = serde_json::to_string(event).unwrap_or_default();
                    error!(
                        error = %response.body,
                        event = %secret.scrub(&event_json),
                        "call failed"
                    );
                } else {
                    warn!(status_code = fault.status_code(), error = %response.body, "call rejected");
                }
                response
            }
        }
    }
}
