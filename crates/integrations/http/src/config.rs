use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use waypoint_core::DEFAULT_REQUEST_TIMEOUT;

/// Client-wide settings for [`HttpRequestRunner`](crate::HttpRequestRunner).
///
/// Per-request timeouts on a descriptor override `timeout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRunnerConfig {
    /// Timeout for requests that reach the client without one.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Follow 3xx redirects.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Headers added to every request unless the descriptor sets them.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

fn default_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_follow_redirects() -> bool {
    true
}

impl Default for HttpRunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            default_headers: HashMap::new(),
        }
    }
}

impl HttpRunnerConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    #[must_use]
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HttpRunnerConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(7000));
        assert!(config.follow_redirects);
        assert!(config.default_headers.is_empty());
    }

    #[test]
    fn builder_chain() {
        let config = HttpRunnerConfig::default()
            .with_timeout(Duration::from_secs(2))
            .with_follow_redirects(false)
            .with_default_header("User-Agent", "waypoint");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert!(!config.follow_redirects);
        assert_eq!(config.default_headers["User-Agent"], "waypoint");
    }
}
