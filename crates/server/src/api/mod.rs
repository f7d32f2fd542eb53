pub mod gateway;
pub mod health;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use waypoint_engine::Dispatcher;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Build the listener's router.
///
/// `/health` answers directly; every other path and method is adapted to an
/// event and handed to the dispatcher.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .fallback(gateway::handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
