use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::catalog::{Catalog, Level, MessageId};

/// Renders catalog messages and emits them as `tracing` events.
///
/// Passed into the job explicitly; the run's `jobnet_id` is attached as a
/// field on every event so lines from one run can be correlated.
#[derive(Debug, Clone)]
pub struct JobLogger {
    catalog: Arc<Catalog>,
    jobnet_id: Option<Arc<str>>,
}

impl JobLogger {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            jobnet_id: None,
        }
    }

    /// Same catalog, tagged with the run's correlation id.
    pub fn for_run(&self, jobnet_id: Option<&str>) -> Self {
        Self {
            catalog: self.catalog.clone(),
            jobnet_id: jobnet_id.map(Arc::from),
        }
    }

    pub fn emit(&self, id: MessageId, args: &[&dyn Display]) {
        let message = self.catalog.render(id, args);
        let code = id.code();
        let jobnet_id = self.jobnet_id.as_deref().unwrap_or("-");
        match id.level() {
            Level::Debug => debug!(code, jobnet_id, "{message}"),
            Level::Info => info!(code, jobnet_id, "{message}"),
            Level::Warn => warn!(code, jobnet_id, "{message}"),
            Level::Error => error!(code, jobnet_id, "{message}"),
        }
    }
}

impl Default for JobLogger {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}
