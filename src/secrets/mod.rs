//! Secret providers: resolve a secret id to the warehouse credentials.

pub mod aws;
pub mod dir;

pub use aws::AwsSecretsManager;
pub use dir::DirectorySecretProvider;

use async_trait::async_trait;

use crate::config::{Config, SecretSource};
use crate::error::JobError;
use crate::types::Credentials;

#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Raw secret string stored under `secret_id`.
    async fn secret_string(&self, secret_id: &str) -> Result<String, JobError>;
}

/// Fetch and parse the credentials stored under `secret_id`. Never retried.
pub async fn fetch_credentials(
    provider: &dyn SecretProvider,
    secret_id: &str,
) -> Result<Credentials, JobError> {
    let payload = provider.secret_string(secret_id).await?;
    Credentials::from_secret_string(secret_id, &payload)
}

/// Provider selected by `secret_source`.
pub async fn from_config(cfg: &Config) -> Result<Box<dyn SecretProvider>, JobError> {
    match cfg.secret_source {
        SecretSource::Aws => Ok(Box::new(AwsSecretsManager::from_config(cfg).await)),
        SecretSource::Dir => {
            let dir = cfg.secret_dir.clone().ok_or_else(|| {
                JobError::configuration("secret_source = \"dir\" requires secret_dir")
            })?;
            Ok(Box::new(DirectorySecretProvider::new(dir)))
        }
    }
}
