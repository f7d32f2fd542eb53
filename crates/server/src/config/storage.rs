use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Where documents are served from.
#[derive(Debug, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Secret store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// Process-local store, optionally seeded from `[secrets.seed]`.
    #[default]
    Memory,
    /// AWS Secrets Manager.
    Aws,
}

impl fmt::Display for SecretBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Aws => "aws",
        })
    }
}

/// Secret store configuration.
#[derive(Deserialize, Default)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretBackend,
    /// Endpoint override for the AWS backend (e.g. `LocalStack`).
    pub endpoint_url: Option<String>,
    /// IAM role to assume for the AWS backend.
    pub role_arn: Option<String>,
    /// Regions besides the API region that secret actions may target.
    #[serde(default)]
    pub allowed_regions: Vec<String>,
    /// Secrets preloaded into the memory backend, keyed by secret id.
    #[serde(default)]
    pub seed: HashMap<String, serde_json::Map<String, serde_json::Value>>,
}

impl fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsConfig")
            .field("backend", &self.backend)
            .field("endpoint_url", &self.endpoint_url)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_regions", &self.allowed_regions)
            .field("seed", &self.seed.keys().collect::<Vec<_>>())
            .finish()
    }
}
