pub mod api;
pub mod config;
pub mod demo;
pub mod endpoints;
pub mod error;
pub mod secret_factory;
pub mod telemetry;

use std::sync::Arc;

use waypoint_engine::{Dispatcher, DispatcherBuilder};
use waypoint_http::HttpRequestRunner;
use waypoint_provider::{DynRequestRunner, FsDocumentStore, SecretStore};

use crate::config::WaypointConfig;
use crate::error::ServerError;

/// Build the dispatcher described by `config`: the demonstration endpoints
/// plus any declared ones, backed by `secrets`.
pub fn build_dispatcher(
    config: &WaypointConfig,
    secrets: Arc<dyn SecretStore>,
) -> Result<Dispatcher, ServerError> {
    let runner: Arc<dyn DynRequestRunner> =
        Arc::new(HttpRequestRunner::new(config.http.runner_config())?);
    build_dispatcher_with_runner(config, secrets, runner)
}

/// [`build_dispatcher`] with a caller-supplied request runner.
pub fn build_dispatcher_with_runner(
    config: &WaypointConfig,
    secrets: Arc<dyn SecretStore>,
    runner: Arc<dyn DynRequestRunner>,
) -> Result<Dispatcher, ServerError> {
    let mut registry = demo::registry();
    endpoints::register(&mut registry, &config.endpoints)?;

    let mut builder = DispatcherBuilder::new(config.api.base_path())
        .registry(registry)
        .runner(runner)
        .secrets(secrets)
        .documents(Arc::new(FsDocumentStore::new(config.documents.root.clone())))
        .region(config.api.region.as_str())
        .max_hops(config.engine.max_hops)
        .refresh_interval(config.lifecycle.refresh_interval())
        .allow_secret_writes(config.engine.allow_secret_writes);
    if let Some(secret_id) = config.api.secret_id() {
        builder = builder.secret_id(secret_id);
    }
    Ok(builder.build()?)
}
