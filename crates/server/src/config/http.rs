use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use waypoint_core::DEFAULT_REQUEST_TIMEOUT;
use waypoint_http::HttpRunnerConfig;

/// Outbound HTTP client configuration.
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Timeout for requests whose descriptor does not set one.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    /// Headers sent with every outbound request.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            follow_redirects: default_follow_redirects(),
            default_headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn runner_config(&self) -> HttpRunnerConfig {
        self.default_headers.iter().fold(
            HttpRunnerConfig::default()
                .with_timeout(Duration::from_millis(self.default_timeout_ms))
                .with_follow_redirects(self.follow_redirects),
            |config, (k, v)| config.with_default_header(k.as_str(), v.as_str()),
        )
    }
}

fn default_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_REQUEST_TIMEOUT.as_millis()).unwrap_or(7000)
}

fn default_follow_redirects() -> bool {
    true
}
