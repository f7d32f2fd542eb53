use waypoint_core::{EndpointName, Event, Fault, HttpMethod};

/// One entry of the endpoint table: a logical name and the methods it
/// accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: EndpointName,
    pub methods: Vec<HttpMethod>,
}

impl Endpoint {
    pub fn new(name: impl Into<EndpointName>, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self {
            name: name.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// An endpoint accepting only `GET`.
    pub fn get(name: impl Into<EndpointName>) -> Self {
        Self::new(name, [HttpMethod::Get])
    }

    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }
}

/// Map an event to the name of the endpoint that handles it.
///
/// `base_path` is `{api}/{version}`; an endpoint matches when the event path
/// equals `/{base_path}/{name}`. Front-ends that strip the API name from the
/// path are tolerated: when the path does not start with `/{api}/`, the API
/// name is prepended before matching. The first matching entry of `table`
/// wins.
pub fn resolve_endpoint_name(
    event: &Event,
    base_path: &str,
    table: &[Endpoint],
) -> Result<EndpointName, Fault> {
    let base_path = base_path.trim_matches('/');
    let not_found = || {
        Fault::NotFound(format!(
            "path not found eventpath: |{}| basePath: |/{base_path}/|",
            event.path.as_deref().unwrap_or("null")
        ))
    };

    let Some(path) = event.path.as_deref() else {
        return Err(not_found());
    };

    let api_name = base_path.split('/').next().unwrap_or_default();
    let api_prefix = format!("/{api_name}/");
    let path = if api_name.is_empty() || path.starts_with(&api_prefix) {
        path.to_owned()
    } else {
        format!("/{api_name}{path}")
    };

    let endpoint = table
        .iter()
        .find(|endpoint| path == format!("/{base_path}/{}", endpoint.name))
        .ok_or_else(not_found)?;

    if endpoint.allows(event.http_method) {
        Ok(endpoint.name.clone())
    } else {
        Err(Fault::MethodNotAllowed {
            method: event.http_method.to_string(),
            endpoint: endpoint.name.to_string(),
        })
    }
}
