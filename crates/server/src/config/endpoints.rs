use serde::Deserialize;
use waypoint_core::HttpMethod;

/// An endpoint declared in configuration as a fixed sequence of actions.
///
/// ```toml
/// [[endpoints]]
/// name = "status"
/// methods = ["GET"]
/// steps = [
///   { request = { url = "https://example.com/status" } },
///   { response = { statusCode = 200, body = "up" } },
/// ]
/// ```
#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    #[serde(default = "default_methods")]
    pub methods: Vec<HttpMethod>,
    /// Action descriptors in their JSON form, run in order.
    #[serde(default)]
    pub steps: Vec<serde_json::Value>,
}

fn default_methods() -> Vec<HttpMethod> {
    vec![HttpMethod::Get]
}
