use serde::Deserialize;
use std::fmt;

use crate::error::JobError;

/// Warehouse connection material resolved from the secret store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shape of the secret string: `{ username, password, host, port, dbName | dbname }`.
#[derive(Deserialize)]
struct SecretPayload {
    username: String,
    password: String,
    host: String,
    port: PortValue,
    #[serde(rename = "dbName", alias = "dbname")]
    db_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

impl Credentials {
    /// Parse a secret string; `secret_id` is only used to label errors.
    pub fn from_secret_string(secret_id: &str, payload: &str) -> Result<Self, JobError> {
        // serde_json errors quote the offending input; keep secret material out of them.
        let payload: SecretPayload = serde_json::from_str(payload).map_err(|e| {
            JobError::secret(
                secret_id,
                format!("malformed secret payload at line {} column {}", e.line(), e.column()),
            )
        })?;

        let port = parse_port(&payload.port)
            .ok_or_else(|| JobError::secret(secret_id, "port must be an integer in 1..=65535"))?;

        for (field, value) in [
            ("host", &payload.host),
            ("dbName", &payload.db_name),
            ("username", &payload.username),
        ] {
            if value.trim().is_empty() {
                return Err(JobError::secret(secret_id, format!("{field} is empty")));
            }
        }

        Ok(Self {
            host: payload.host,
            port,
            database: payload.db_name,
            username: payload.username,
            password: payload.password,
        })
    }
}

fn parse_port(value: &PortValue) -> Option<u16> {
    let port = match value {
        PortValue::Number(n) => u16::try_from(*n).ok()?,
        PortValue::Text(s) => {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<u16>().ok()?
        }
    };
    (port != 0).then_some(port)
}
