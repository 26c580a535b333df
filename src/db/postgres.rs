use async_trait::async_trait;
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use std::time::Duration;
use tracing::debug;

use super::session::{Connector, Session};
use crate::config::Config;
use crate::error::JobError;
use crate::types::Credentials;

#[derive(Debug, Clone)]
pub struct PgConnector {
    connect_timeout: Duration,
    application_name: String,
}

impl PgConnector {
    pub fn new(connect_timeout: Duration, application_name: impl Into<String>) -> Self {
        Self {
            connect_timeout,
            application_name: application_name.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.connect_timeout(), cfg.application_name.clone())
    }

    fn connect_options(&self, creds: &Credentials) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&creds.host)
            .port(creds.port)
            .database(&creds.database)
            .username(&creds.username)
            .password(&creds.password)
            .application_name(&self.application_name)
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, creds: &Credentials) -> Result<Box<dyn Session>, JobError> {
        let opts = self.connect_options(creds);
        let conn = tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&opts))
            .await
            .map_err(|_| {
                JobError::Connection(format!(
                    "timed out after {:?} connecting to {}:{}",
                    self.connect_timeout, creds.host, creds.port
                ))
            })?
            .map_err(|e| JobError::Connection(e.to_string()))?;
        Ok(Box::new(PgSession::new(conn)))
    }
}

/// Session over one `PgConnection`; statements go out on the simple query protocol.
///
/// `Default` is a session that is already closed.
#[derive(Default)]
pub struct PgSession {
    conn: Option<PgConnection>,
}

impl PgSession {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> Result<&mut PgConnection, sqlx::Error> {
        self.conn
            .as_mut()
            .ok_or_else(|| sqlx::Error::Protocol("session closed".into()))
    }

    async fn raw(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        debug!(sql, "executing");
        let conn = self.conn()?;
        let done = sqlx::Executor::execute(conn, sqlx::raw_sql(sql)).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl Session for PgSession {
    async fn begin(&mut self) -> Result<(), sqlx::Error> {
        self.raw("BEGIN").await.map(|_| ())
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        self.raw(sql).await
    }

    async fn commit(&mut self) -> Result<(), sqlx::Error> {
        self.raw("COMMIT").await.map(|_| ())
    }

    async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        self.raw("ROLLBACK").await.map(|_| ())
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        match self.conn.take() {
            Some(conn) => conn.close().await,
            None => Ok(()),
        }
    }
}
