mod api;
mod endpoints;
mod engine;
mod http;
mod server;
mod storage;


pub use api::*;
pub use endpoints::*;
pub use engine::*;
pub use http::*;
pub use server::*;
pub use storage::*;

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ServerError;

/// Top-level configuration for the Waypoint server, loaded from a TOML file
/// and then overridden from the environment.
#[derive(Debug, Default, Deserialize)]
pub struct WaypointConfig {
    /// API identity: name, version, environment, region.
    #[serde(default)]
    pub api: ApiConfig,
    /// HTTP listener bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chain engine limits and privileges.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Session secret refresh window.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Outbound HTTP client.
    #[serde(default)]
    pub http: HttpConfig,
    /// Document store location.
    #[serde(default)]
    pub documents: DocumentsConfig,
    /// Secret store backend.
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Endpoints declared as fixed action sequences.
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl WaypointConfig {
    /// Load from `path` (defaults when the file does not exist), then apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let mut config: Self = if path.exists() {
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override API settings from `API_NAME`, `API_VERSION`, `ENVIRONMENT`,
    /// `AWS_REGION` and `DEBUG`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("API_NAME") {
            self.api.name = name;
        }
        if let Some(version) = lookup("API_VERSION") {
            self.api.version = version;
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.api.environment = environment;
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.api.region = region;
        }
        if let Some(debug) = lookup("DEBUG") {
            self.api.debug = debug.eq_ignore_ascii_case("true");
        }
    }
}
