pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod service;
pub mod types;

pub use error::JobError;
pub use service::{CopyJob, CopyReport};
pub use types::JobParameters;
