use serde::{Deserialize, Serialize};

/// Connection settings for the Secrets Manager store.
///
/// `region` is the default. A secret action may name another region listed
/// in `allowed_regions`, in which case a client for it is built on first use.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// Default AWS region (e.g. `"eu-west-1"`).
    pub region: String,

    /// Endpoint override for local development (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// IAM role to assume via STS before talking to Secrets Manager.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// STS session name (defaults to `"waypoint-secrets"`).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Regions besides `region` that secret actions may target.
    #[serde(default)]
    pub allowed_regions: Vec<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("session_name", &self.session_name)
            .field("allowed_regions", &self.allowed_regions)
            .finish()
    }
}

impl AwsBaseConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint_url: None,
            role_arn: None,
            session_name: None,
            allowed_regions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    #[must_use]
    pub fn with_allowed_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether secret actions may target `region`.
    pub fn allows_region(&self, region: &str) -> bool {
        region == self.region || self.allowed_regions.iter().any(|r| r == region)
    }

    /// Copy of this configuration pointed at another region.
    #[must_use]
    pub fn for_region(&self, region: &str) -> Self {
        Self {
            region: region.to_owned(),
            ..self.clone()
        }
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}
