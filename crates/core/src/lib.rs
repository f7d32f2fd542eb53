pub mod content;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod method;
pub mod outcome;
pub mod payload;
pub mod response;
pub mod secret;
pub mod types;

pub use content::{ContentKind, ImageFormat};
pub use descriptor::{
    Action, ActionDescriptor, DEFAULT_REQUEST_TIMEOUT, DocumentSpec, RequestSpec, ResponseSpec,
    SecretMethod, SecretSpec,
};
pub use error::{ErrorBody, Fault};
pub use event::Event;
pub use method::{HttpMethod, UnsupportedMethod};
pub use outcome::{ChainState, RawOutcome};
pub use payload::Payload;
pub use response::ResponseRecord;
pub use secret::{SCRUBBED, Secret};
pub use types::{Continuation, EndpointName, SecretId};
