use std::sync::Arc;

use tracing::info;
use waypoint_core::Secret;
use waypoint_provider::{MemorySecretStore, SecretStore};

use crate::config::{SecretBackend, SecretsConfig};
use crate::error::ServerError;

/// Create the secret store selected by `config`.
///
/// `region` is the default region for the AWS backend.
pub async fn create_secret_store(
    config: &SecretsConfig,
    region: &str,
) -> Result<Arc<dyn SecretStore>, ServerError> {
    match config.backend {
        SecretBackend::Memory => {
            let store = config.seed.iter().try_fold(
                MemorySecretStore::new(),
                |store, (id, fields)| -> Result<_, ServerError> {
                    let secret = Secret::from_json(serde_json::Value::Object(fields.clone()))?;
                    Ok(store.with_secret(id.as_str(), secret))
                },
            )?;
            info!(seeded = store.len(), "memory secret store initialized");
            Ok(Arc::new(store))
        }
        SecretBackend::Aws => create_aws(config, region).await,
    }
}

#[cfg(feature = "aws")]
async fn create_aws(
    config: &SecretsConfig,
    region: &str,
) -> Result<Arc<dyn SecretStore>, ServerError> {
    let mut aws = waypoint_aws::AwsBaseConfig::new(region)
        .with_allowed_regions(config.allowed_regions.iter().cloned());
    if let Some(endpoint_url) = &config.endpoint_url {
        aws = aws.with_endpoint_url(endpoint_url.as_str());
    }
    if let Some(role_arn) = &config.role_arn {
        aws = aws.with_role_arn(role_arn.as_str());
    }
    let store = waypoint_aws::SecretsManagerStore::new(aws).await;
    info!(%region, allowed = ?config.allowed_regions, "secrets manager store initialized");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "aws"))]
#[allow(clippy::unused_async)]
async fn create_aws(
    _config: &SecretsConfig,
    _region: &str,
) -> Result<Arc<dyn SecretStore>, ServerError> {
    Err(ServerError::Config(
        "secrets backend \"aws\" requires the `aws` feature".into(),
    ))
}
