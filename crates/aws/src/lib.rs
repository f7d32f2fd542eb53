//! AWS collaborators for the Waypoint router.
//!
//! [`SecretsManagerStore`] implements the secret store on top of AWS Secrets
//! Manager, with one client per region and optional STS assume-role
//! credentials configured through [`AwsBaseConfig`].

pub mod auth;
pub mod config;
pub mod error;
pub mod secrets;

pub use config::AwsBaseConfig;
pub use error::AwsProviderError;
pub use secrets::SecretsManagerStore;
