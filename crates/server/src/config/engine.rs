use std::time::Duration;

use serde::Deserialize;
use waypoint_engine::{DEFAULT_MAX_HOPS, DEFAULT_REFRESH_INTERVAL};

/// Chain engine configuration.
#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Hops allowed per call before the chain is aborted.
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
    /// Grant secret actions the privilege to write.
    #[serde(default)]
    pub allow_secret_writes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            allow_secret_writes: false,
        }
    }
}

fn default_max_hops() -> u32 {
    DEFAULT_MAX_HOPS
}

/// Session secret refresh configuration.
#[derive(Debug, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

impl LifecycleConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs()
}
