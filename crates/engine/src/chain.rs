use std::sync::Arc;

use tracing::{debug, info, instrument};
use waypoint_core::{ChainState, EndpointName, Event, Fault, ResponseRecord};

use crate::executor::ActionExecutor;
use crate::lifecycle::SessionState;
use crate::normalizer::normalize;
use crate::resolver::{ResolveContext, ResolverRegistry};

/// Upper bound on hops per call unless configured otherwise.
pub const DEFAULT_MAX_HOPS: u32 = 10;

/// Drives the resolve, execute, normalize loop for one call.
#[derive(Debug)]
pub struct ChainEngine {
    registry: Arc<ResolverRegistry>,
    executor: ActionExecutor,
    max_hops: u32,
}

impl ChainEngine {
    pub fn new(registry: Arc<ResolverRegistry>, executor: ActionExecutor) -> Self {
        Self {
            registry,
            executor,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    #[must_use]
    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Run the chain for `endpoint` until a descriptor without a
    /// continuation has been executed, and return its normalized record.
    ///
    /// Hops run strictly one after another; each resolver call sees the
    /// previous hop's record. A secret written by a hop under the session's
    /// own id replaces the session secret before the next hop resolves.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn run(
        &self,
        event: &Event,
        session: &SessionState,
        endpoint: &EndpointName,
    ) -> Result<ResponseRecord, Fault> {
        let mut previous: Option<ChainState> = None;
        let mut hop: u32 = 0;

        loop {
            let secret = session.secret().await;
            let ctx = ResolveContext {
                event,
                secret: &secret,
                endpoint,
                previous: previous.as_ref(),
            };
            let descriptor = self.registry.resolve(&ctx)?;

            if hop >= self.max_hops {
                return Err(Fault::Configuration(format!(
                    "chain for |{endpoint}| exceeded {} hops",
                    self.max_hops
                )));
            }
            hop += 1;
            debug!(hop, action = descriptor.action.kind(), continuation = ?descriptor.continuation, "executing hop");

            let execution = self.executor.execute(&descriptor.action).await?;
            if let Some(write) = execution.written
                && session.secret_id() == Some(&write.secret_id)
            {
                info!(secret_id = %write.secret_id, "session secret replaced by chain write");
                session.replace_secret(write.secret).await;
            }

            let response = normalize(&execution.outcome);
            match descriptor.continuation {
                None => {
                    debug!(hops = hop, status_code = response.status_code, "chain finished");
                    return Ok(response);
                }
                Some(continuation) => {
                    previous = Some(ChainState {
                        continuation,
                        hop,
                        response,
                        payload: execution.outcome.body,
                    });
                }
            }
        }
    }
}
