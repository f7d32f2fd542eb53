//! The action-chaining engine.
//!
//! A call is routed to an endpoint, whose resolver picks an action; the
//! executor runs it and the normalizer turns the outcome into a response
//! record. While the resolver keeps returning continuations, the previous
//! record is fed back in and the loop repeats. [`Dispatcher`] is the entry
//! point and never fails: faults come back as error responses.

pub mod builder;
pub mod chain;
pub mod dispatcher;
pub mod executor;
pub mod lifecycle;
pub mod normalizer;
pub mod resolver;
pub mod router;

pub use builder::DispatcherBuilder;
pub use chain::{ChainEngine, DEFAULT_MAX_HOPS};
pub use dispatcher::Dispatcher;
pub use executor::{ActionExecutor, Execution, SecretWrite};
pub use lifecycle::{DEFAULT_REFRESH_INTERVAL, LifecycleManager, SessionState};
pub use normalizer::{content_kind, normalize};
pub use resolver::{ResolveContext, Resolver, ResolverRegistry};
pub use router::{Endpoint, resolve_endpoint_name};
