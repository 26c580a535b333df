use crate::error::JobError;
use crate::types::{CopyRoute, JobParameters, TableRef, Tier};

/// Truncate-and-reload statements for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub route: Option<CopyRoute>,
    pub source: TableRef,
    pub target: TableRef,
    pub truncate: String,
    pub insert: String,
}

impl CopyPlan {
    pub fn new(route: Option<CopyRoute>, source: TableRef, target: TableRef) -> Self {
        let truncate = format!("TRUNCATE TABLE {target}");
        let insert = format!("INSERT INTO {target} SELECT * FROM {source}");
        Self {
            route,
            source,
            target,
            truncate,
            insert,
        }
    }

    /// Statements in execution order.
    pub fn statements(&self) -> [&str; 2] {
        [&self.truncate, &self.insert]
    }
}

/// Resolve source and target from the parameters and render the SQL.
///
/// With a mode selector the tier tables decide the copy, and an explicit
/// `SOURCE`/`TARGET` table alongside it is rejected rather than ignored.
/// Without one the explicit pair is used, falling back to raw -> storage.
pub fn build_statements(params: &JobParameters) -> Result<CopyPlan, JobError> {
    if let Some(mode) = params.mode {
        let route = CopyRoute::from_mode(mode)?;
        if params.source.is_some() || params.target.is_some() {
            return Err(JobError::configuration(format!(
                "SCHEMA_NO={mode} routes by tier tables; drop SOURCE_*/TARGET_* or SCHEMA_NO"
            )));
        }
        let source = tier_table(params, route.source_tier())?;
        let target = tier_table(params, route.target_tier())?;
        return plan(Some(route), source, target);
    }

    let source = params
        .source
        .clone()
        .or_else(|| params.tiers.get(&Tier::Raw).cloned());
    let target = params
        .target
        .clone()
        .or_else(|| params.tiers.get(&Tier::Storage).cloned());

    match (source, target) {
        (Some(source), Some(target)) => plan(None, source, target),
        (None, _) => Err(JobError::configuration("source table is not configured")),
        (_, None) => Err(JobError::configuration("target table is not configured")),
    }
}

fn plan(
    route: Option<CopyRoute>,
    source: TableRef,
    target: TableRef,
) -> Result<CopyPlan, JobError> {
    if source == target {
        return Err(JobError::configuration(format!(
            "source and target are the same table: {target}"
        )));
    }
    Ok(CopyPlan::new(route, source, target))
}

fn tier_table(params: &JobParameters, tier: Tier) -> Result<TableRef, JobError> {
    params.tiers.get(&tier).cloned().ok_or_else(|| {
        JobError::configuration(format!(
            "{tier} tier table is required for SCHEMA_NO={}: pass --{p}_SCHEMA and --{p}_TABLE",
            params.mode.unwrap_or_default(),
            p = tier.option_prefix()
        ))
    })
}
