use async_trait::async_trait;

use crate::error::JobError;
use crate::types::Credentials;

/// Opens warehouse sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, creds: &Credentials) -> Result<Box<dyn Session>, JobError>;
}

/// A single warehouse connection.
///
/// Transaction control is explicit so the caller decides when to commit and
/// when to roll back. `close` is called once, after which the session is dropped.
#[async_trait]
pub trait Session: Send {
    async fn begin(&mut self) -> Result<(), sqlx::Error>;

    /// Run one statement; returns the affected row count when the server reports it.
    async fn execute(&mut self, sql: &str) -> Result<u64, sqlx::Error>;

    async fn commit(&mut self) -> Result<(), sqlx::Error>;

    async fn rollback(&mut self) -> Result<(), sqlx::Error>;

    async fn close(&mut self) -> Result<(), sqlx::Error>;
}
