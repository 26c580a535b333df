use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::SecretProvider;
use crate::error::JobError;

/// Reads secrets from `<dir>/<secret_id>.json`, for running the job locally.
#[derive(Debug, Clone)]
pub struct DirectorySecretProvider {
    dir: PathBuf,
}

impl DirectorySecretProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn secret_path(&self, secret_id: &str) -> Result<PathBuf, JobError> {
        // Secret ids like `prod/redshift` map to nested files; never outside `dir`.
        let escapes = Path::new(secret_id)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if secret_id.is_empty() || escapes {
            return Err(JobError::secret(
                secret_id,
                "invalid secret id for directory lookup",
            ));
        }
        Ok(self.dir.join(format!("{secret_id}.json")))
    }
}

#[async_trait]
impl SecretProvider for DirectorySecretProvider {
    async fn secret_string(&self, secret_id: &str) -> Result<String, JobError> {
        let path = self.secret_path(secret_id)?;
        debug!(path = %path.display(), "reading secret file");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| JobError::secret(secret_id, format!("{}: {e}", path.display())))
    }
}
