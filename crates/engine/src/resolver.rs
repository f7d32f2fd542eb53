use std::collections::HashMap;
use std::sync::Arc;

use waypoint_core::{ActionDescriptor, ChainState, EndpointName, Event, Fault, Secret};

use crate::router::Endpoint;

/// Everything a resolver may look at when choosing the next action.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub event: &'a Event,
    pub secret: &'a Secret,
    pub endpoint: &'a EndpointName,
    /// The previous hop; `None` on the first call of a chain.
    pub previous: Option<&'a ChainState>,
}

impl ResolveContext<'_> {
    /// Continuation marker of the previous hop, if any.
    pub fn continuation(&self) -> Option<u32> {
        self.previous.map(|p| p.continuation.get())
    }

    pub fn is_first_hop(&self) -> bool {
        self.previous.is_none()
    }
}

/// Chooses the action for one hop of an endpoint's chain.
///
/// Implementations must be pure functions of the context: everything that
/// varies between hops arrives through [`ResolveContext::previous`].
pub trait Resolver: Send + Sync {
    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<ActionDescriptor, Fault>;
}

/// Adapter so plain closures can be registered as resolvers.
struct FnResolver<F>(F);

impl<F> Resolver for FnResolver<F>
where
    F: Fn(&ResolveContext<'_>) -> Result<ActionDescriptor, Fault> + Send + Sync,
{
    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<ActionDescriptor, Fault> {
        (self.0)(ctx)
    }
}

/// The endpoint table together with the resolver behind each entry.
#[derive(Default, Clone)]
pub struct ResolverRegistry {
    endpoints: Vec<Endpoint>,
    resolvers: HashMap<EndpointName, Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver. Re-registering a name replaces its resolver and
    /// methods but keeps its position in the table.
    pub fn register(&mut self, endpoint: Endpoint, resolver: Arc<dyn Resolver>) {
        if let Some(existing) = self.endpoints.iter_mut().find(|e| e.name == endpoint.name) {
            existing.methods.clone_from(&endpoint.methods);
        } else {
            self.endpoints.push(endpoint.clone());
        }
        self.resolvers.insert(endpoint.name, resolver);
    }

    /// Register a closure as a resolver.
    pub fn register_fn<F>(&mut self, endpoint: Endpoint, resolver: F)
    where
        F: Fn(&ResolveContext<'_>) -> Result<ActionDescriptor, Fault> + Send + Sync + 'static,
    {
        self.register(endpoint, Arc::new(FnResolver(resolver)));
    }

    /// Endpoint table in registration order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Ask the endpoint's resolver for the next descriptor.
    ///
    /// An endpoint without a resolver is a configuration fault; the router
    /// only hands out names from the same table, so this signals a wiring
    /// bug rather than bad input.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<ActionDescriptor, Fault> {
        let resolver = self
            .resolvers
            .get(ctx.endpoint)
            .ok_or_else(|| Fault::Configuration(format!("|{}| endpoint unknown", ctx.endpoint)))?;
        resolver.resolve(ctx)
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
