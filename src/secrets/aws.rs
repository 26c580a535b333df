use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::{Client, error::DisplayErrorContext};

use super::SecretProvider;
use crate::config::Config;
use crate::error::JobError;

/// AWS Secrets Manager backed provider.
#[derive(Debug, Clone)]
pub struct AwsSecretsManager {
    client: Client,
}

impl AwsSecretsManager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from the default credential chain, honoring
    /// `aws_region` and `aws_endpoint_url` when set.
    pub async fn from_config(cfg: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = cfg.aws_region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = cfg.aws_endpoint_url.as_deref() {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl SecretProvider for AwsSecretsManager {
    async fn secret_string(&self, secret_id: &str) -> Result<String, JobError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| JobError::secret(secret_id, DisplayErrorContext(&e)))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| JobError::secret(secret_id, "secret has no SecretString"))
    }
}
