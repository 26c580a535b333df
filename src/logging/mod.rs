//! Logging: coded message catalog and the job logger that emits it.

pub mod catalog;
pub mod logger;

pub use catalog::{Catalog, Level, MessageId};
pub use logger::JobLogger;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the process-wide `fmt` subscriber. `RUST_LOG` wins over `loglevel`.
pub fn init_tracing(loglevel: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();
}
