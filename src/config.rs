//! Runtime configuration for the copy job.
//!
//! Sources, later overriding earlier:
//! - built-in defaults
//! - `dwh-copy.toml` in the working directory (optional)
//! - environment variables prefixed `DWH_COPY_` (e.g. `DWH_COPY_LOGLEVEL=debug`)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::JobError;

pub const CONFIG_FILE: &str = "dwh-copy.toml";
pub const ENV_PREFIX: &str = "DWH_COPY_";

/// Where database credentials are resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    /// AWS Secrets Manager `GetSecretValue`.
    Aws,
    /// `<secret_dir>/<secret_id>.json` on the local filesystem.
    Dir,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub loglevel: String,
    pub job_name: String,
    pub secret_source: SecretSource,
    pub secret_dir: Option<PathBuf>,
    pub aws_region: Option<String>,
    pub aws_endpoint_url: Option<String>,
    pub connect_timeout_secs: u64,
    pub application_name: String,
    pub messages_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            job_name: "DWH_DB_DB_DATA_COPY".to_string(),
            secret_source: SecretSource::Aws,
            secret_dir: None,
            aws_region: None,
            aws_endpoint_url: None,
            connect_timeout_secs: 30,
            application_name: "dwh-copy".to_string(),
            messages_path: None,
        }
    }
}

impl Config {
    /// Load defaults, the optional TOML file and `DWH_COPY_*` environment overrides.
    pub fn load() -> Result<Self, JobError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, JobError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn validate(&self) -> Result<(), JobError> {
        if self.secret_source == SecretSource::Dir && self.secret_dir.is_none() {
            return Err(JobError::configuration(
                "secret_source = \"dir\" requires secret_dir",
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(JobError::configuration("connect_timeout_secs must be > 0"));
        }
        Ok(())
    }
}
