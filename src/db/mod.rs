//! Warehouse access: one session per run, no pooling.
//!
//! Layout:
//! - `session.rs`: `Connector`/`Session` seams the copy job drives
//! - `postgres.rs`: sqlx `PgConnection` implementation (Redshift speaks the PG wire protocol)

pub mod postgres;
pub mod session;

pub use postgres::{PgConnector, PgSession};
pub use session::{Connector, Session};
