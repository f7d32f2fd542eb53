use serde::Deserialize;
use waypoint_core::SecretId;

/// Identity of the deployed API.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// API name; first segment of every endpoint path.
    #[serde(default = "default_name")]
    pub name: String,
    /// API version; second segment of every endpoint path.
    #[serde(default = "default_version")]
    pub version: String,
    /// Deployment environment (e.g. `dev`, `prod`).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Default AWS region for secret operations.
    #[serde(default = "default_region")]
    pub region: String,
    /// Log at `debug` when `RUST_LOG` is unset.
    #[serde(default)]
    pub debug: bool,
    /// Whether this deployment holds a session secret.
    #[serde(default)]
    pub has_secret: bool,
    /// Session secret id; defaults to `{name}/{environment}`.
    pub secret_id: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            environment: default_environment(),
            region: default_region(),
            debug: false,
            has_secret: false,
            secret_id: None,
        }
    }
}

impl ApiConfig {
    /// `{name}/{version}`, the prefix every endpoint path starts with.
    pub fn base_path(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// The session secret id, or `None` when the deployment has no secret.
    pub fn secret_id(&self) -> Option<SecretId> {
        if !self.has_secret {
            return None;
        }
        Some(match &self.secret_id {
            Some(id) => SecretId::new(id.as_str()),
            None => SecretId::new(format!("{}/{}", self.name, self.environment)),
        })
    }
}

fn default_name() -> String {
    "waypoint".to_owned()
}

fn default_version() -> String {
    "v1".to_owned()
}

fn default_environment() -> String {
    "dev".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}
