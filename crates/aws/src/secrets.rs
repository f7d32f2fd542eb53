use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use dashmap::DashMap;
use tracing::{debug, instrument, warn};
use waypoint_core::{Secret, SecretId};
use waypoint_provider::{ProviderError, SecretStore, StoreReceipt};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsProviderError, classify_sdk_error};

/// [`SecretStore`] backed by AWS Secrets Manager.
///
/// Secret values are stored as JSON object strings. One client is kept per
/// allowed region, built lazily the first time that region is used. Other
/// regions are refused before any client is built.
pub struct SecretsManagerStore {
    config: AwsBaseConfig,
    clients: DashMap<String, Client>,
}

impl SecretsManagerStore {
    /// Create a store and its client for the default region.
    pub async fn new(config: AwsBaseConfig) -> Self {
        let sdk_config = build_sdk_config(&config).await;
        let clients = DashMap::new();
        clients.insert(config.region.clone(), Client::new(&sdk_config));
        Self { config, clients }
    }

    /// Create a store around an existing client for the default region.
    pub fn with_client(config: AwsBaseConfig, client: Client) -> Self {
        let clients = DashMap::new();
        clients.insert(config.region.clone(), client);
        Self { config, clients }
    }

    pub fn config(&self) -> &AwsBaseConfig {
        &self.config
    }

    async fn client(&self, region: Option<&str>) -> Result<Client, AwsProviderError> {
        let region = region.unwrap_or(&self.config.region);
        if let Some(client) = self.clients.get(region) {
            return Ok(client.value().clone());
        }
        if !self.config.allows_region(region) {
            return Err(AwsProviderError::RegionNotAllowed(region.to_owned()));
        }
        debug!(region, "building Secrets Manager client");
        let sdk_config = build_sdk_config(&self.config.for_region(region)).await;
        let client = Client::new(&sdk_config);
        // Concurrent first use may build twice; the last insert wins.
        self.clients.insert(region.to_owned(), client.clone());
        Ok(client)
    }

    /// Fetch and parse a secret, surfacing the failure reason.
    pub async fn fetch(
        &self,
        secret_id: &SecretId,
        region: Option<&str>,
    ) -> Result<Secret, AwsProviderError> {
        let output = self
            .client(region)
            .await?
            .get_secret_value()
            .secret_id(secret_id.as_str())
            .send()
            .await
            .map_err(|e| {
                if e
                    .as_service_error()
                    .is_some_and(GetSecretValueError::is_resource_not_found_exception)
                {
                    AwsProviderError::NotFound(secret_id.to_string())
                } else {
                    classify_sdk_error(&DisplayErrorContext(&e).to_string())
                }
            })?;

        let raw = output
            .secret_string()
            .ok_or_else(|| AwsProviderError::InvalidSecret("secret has no string value".into()))?;
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|_| AwsProviderError::InvalidSecret("secret is not JSON".into()))?;
        Secret::from_json(value).map_err(|e| AwsProviderError::InvalidSecret(e.to_string()))
    }

    /// Write a secret, surfacing the failure reason.
    pub async fn put(
        &self,
        secret_id: &SecretId,
        secret: &Secret,
        region: Option<&str>,
    ) -> Result<StoreReceipt, AwsProviderError> {
        let body = secret.to_json().to_string();
        let output = self
            .client(region)
            .await?
            .put_secret_value()
            .secret_id(secret_id.as_str())
            .secret_string(body)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&DisplayErrorContext(&e).to_string()))?;

        Ok(StoreReceipt {
            secret_id: secret_id.clone(),
            version: output.version_id().map(str::to_owned),
        })
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    #[instrument(skip(self), fields(secret_id = %secret_id))]
    async fn get(&self, secret_id: &SecretId, region: Option<&str>) -> Option<Secret> {
        match self.fetch(secret_id, region).await {
            Ok(secret) => Some(secret),
            Err(AwsProviderError::NotFound(_)) => {
                debug!("secret does not exist");
                None
            }
            Err(e) => {
                warn!(error = %ProviderError::from(e), "failed to read secret");
                None
            }
        }
    }

    #[instrument(skip(self, secret), fields(secret_id = %secret_id))]
    async fn store(
        &self,
        secret_id: &SecretId,
        secret: &Secret,
        region: Option<&str>,
    ) -> Option<StoreReceipt> {
        match self.put(secret_id, secret, region).await {
            Ok(receipt) => {
                debug!(version = ?receipt.version, "secret stored");
                Some(receipt)
            }
            Err(e) => {
                warn!(error = %ProviderError::from(e), "failed to store secret");
                None
            }
        }
    }
}
