//! Endpoints declared in configuration.

use std::sync::Arc;

use waypoint_core::{ActionDescriptor, Fault};
use waypoint_engine::{Endpoint, ResolveContext, Resolver, ResolverRegistry};

use crate::config::EndpointConfig;

/// Resolver that walks a fixed list of descriptors.
///
/// Hop `i` returns `steps[i]`; every step but the last carries continuation
/// `i + 1`, which is how the next call finds its place.
#[derive(Debug)]
pub struct StepsResolver {
    steps: Vec<ActionDescriptor>,
}

impl StepsResolver {
    /// Validate and take ownership of `steps`.
    pub fn new(steps: Vec<ActionDescriptor>) -> Result<Self, Fault> {
        if steps.is_empty() {
            return Err(Fault::Configuration("endpoint declares no steps".into()));
        }
        let last = steps.len() - 1;
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                let mut step = ActionDescriptor {
                    continuation: None,
                    ..step
                };
                if i < last {
                    step = step.with_continuation(u32::try_from(i + 1).unwrap_or(u32::MAX));
                }
                step
            })
            .collect();
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Resolver for StepsResolver {
    fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<ActionDescriptor, Fault> {
        let index = ctx.continuation().unwrap_or(0) as usize;
        self.steps.get(index).cloned().ok_or_else(|| {
            Fault::Configuration(format!("|{}| has no step {index}", ctx.endpoint))
        })
    }
}

/// Register every configured endpoint.
///
/// # Errors
///
/// Fails on the first endpoint without steps or with a step that is not a
/// valid descriptor.
pub fn register(registry: &mut ResolverRegistry, endpoints: &[EndpointConfig]) -> Result<(), Fault> {
    for endpoint in endpoints {
        let steps = endpoint
            .steps
            .iter()
            .cloned()
            .map(ActionDescriptor::from_json)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Fault::Configuration(format!("endpoint |{}|: {e}", endpoint.name)))?;
        let resolver = StepsResolver::new(steps)
            .map_err(|e| Fault::Configuration(format!("endpoint |{}|: {e}", endpoint.name)))?;
        registry.register(
            Endpoint::new(endpoint.name.as_str(), endpoint.methods.iter().copied()),
            Arc::new(resolver),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use waypoint_core::{EndpointName, Event, HttpMethod, Secret};

    use super::*;

    fn config(name: &str, steps: Vec<serde_json::Value>) -> EndpointConfig {
        EndpointConfig {
            name: name.to_owned(),
            methods: vec![HttpMethod::Get],
            steps,
        }
    }

    #[test]
    fn steps_are_chained_in_order() {
        let mut registry = ResolverRegistry::new();
        register(
            &mut registry,
            &[config(
                "status",
                vec![
                    serde_json::json!({"request": {"url": "https://example.com/a"}}),
                    serde_json::json!({"request": {"url": "https://example.com/b"}, "continuation": 9}),
                    serde_json::json!({"response": {"body": "done"}}),
                ],
            )],
        )
        .unwrap();

        let event = Event::new(HttpMethod::Get, "/waypoint/v1/status");
        let secret = Secret::new();
        let endpoint = EndpointName::new("status");
        let ctx = ResolveContext {
            event: &event,
            secret: &secret,
            endpoint: &endpoint,
            previous: None,
        };
        let first = registry.resolve(&ctx).unwrap();
        assert_eq!(first.continuation.map(|c| c.get()), Some(1));
        assert_eq!(first.action.kind(), "request");
        assert_eq!(registry.endpoints()[0].name.as_str(), "status");
    }

    #[test]
    fn continuation_picks_the_step() {
        let resolver = StepsResolver::new(vec![
            ActionDescriptor::from_json(serde_json::json!({"response": {"body": "one"}})).unwrap(),
            ActionDescriptor::from_json(serde_json::json!({"response": {"body": "two"}})).unwrap(),
        ])
        .unwrap();
        assert_eq!(resolver.len(), 2);
        assert!(resolver.steps[0].continuation.is_some());
        assert!(resolver.steps[1].is_terminal());
    }

    #[test]
    fn endpoint_without_steps_is_rejected() {
        let mut registry = ResolverRegistry::new();
        let err = register(&mut registry, &[config("empty", vec![])]).unwrap_err();
        assert_eq!(err.to_string(), "endpoint |empty|: endpoint declares no steps");
        assert!(registry.is_empty());
    }

    #[test]
    fn invalid_step_is_rejected() {
        let mut registry = ResolverRegistry::new();
        let err = register(
            &mut registry,
            &[config("bad", vec![serde_json::json!({"teleport": {}})])],
        )
        .unwrap_err();
        assert!(matches!(err, Fault::Configuration(_)));
        assert!(err.to_string().contains("descriptor unprocessable"));
    }

    #[test]
    fn step_naming_two_actions_is_rejected() {
        let mut registry = ResolverRegistry::new();
        let err = register(
            &mut registry,
            &[config(
                "mixed",
                vec![serde_json::json!({
                    "request": {"url": "https://example.com/a"},
                    "response": {"body": "done"}
                })],
            )],
        )
        .unwrap_err();
        assert!(matches!(err, Fault::Configuration(_)));
        assert!(err.to_string().starts_with("endpoint |mixed|:"), "{err}");
        assert!(registry.is_empty());
    }
}
