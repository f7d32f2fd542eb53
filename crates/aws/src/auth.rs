use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration from an [`AwsBaseConfig`].
///
/// Credentials come from the standard environment chain. When `role_arn` is
/// set the role is assumed through STS with auto-refreshing credentials.
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let region = aws_config::Region::new(config.region.clone());
    let mut loader = aws_config::from_env().region(region.clone());

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    let Some(role_arn) = &config.role_arn else {
        return loader.load().await;
    };

    let session_name = config.session_name.as_deref().unwrap_or("waypoint-secrets");
    info!(session_name = %session_name, region = %config.region, "assuming IAM role via STS");

    let base_config = loader.load().await;
    let assume_role = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(region.clone())
        .configure(&base_config)
        .build()
        .await;

    let mut final_loader = aws_config::from_env()
        .region(region)
        .credentials_provider(assume_role);
    if let Some(endpoint) = &config.endpoint_url {
        final_loader = final_loader.endpoint_url(endpoint);
    }
    final_loader.load().await
}
