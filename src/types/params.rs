use std::collections::BTreeMap;

use super::args::JobArgs;
use super::table::{TableRef, Tier};
use crate::error::JobError;

pub const SECRET_NAME: &str = "SECRET_NAME";
pub const SCHEMA_NO: &str = "SCHEMA_NO";

/// Everything one run needs to know, resolved before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
    pub secret_name: String,
    pub source: Option<TableRef>,
    pub target: Option<TableRef>,
    pub tiers: BTreeMap<Tier, TableRef>,
    /// Raw `SCHEMA_NO`; checked against the known routes when statements are built.
    pub mode: Option<i64>,
    pub jobnet_id: Option<String>,
}

impl JobParameters {
    pub fn new(secret_name: impl Into<String>, source: TableRef, target: TableRef) -> Self {
        Self {
            secret_name: secret_name.into(),
            source: Some(source),
            target: Some(target),
            tiers: BTreeMap::new(),
            mode: None,
            jobnet_id: None,
        }
    }

    /// Parameters for a `SCHEMA_NO` routed run; tier tables are added with [`Self::with_tier`].
    pub fn routed(secret_name: impl Into<String>, mode: i64) -> Self {
        Self {
            secret_name: secret_name.into(),
            source: None,
            target: None,
            tiers: BTreeMap::new(),
            mode: Some(mode),
            jobnet_id: None,
        }
    }

    pub fn with_tier(mut self, tier: Tier, table: TableRef) -> Self {
        self.tiers.insert(tier, table);
        self
    }

    pub fn with_jobnet_id(mut self, jobnet_id: impl Into<String>) -> Self {
        self.jobnet_id = Some(jobnet_id.into());
        self
    }

    /// Build parameters from parsed invocation arguments.
    ///
    /// Accepted table options: `SOURCE_*`/`TARGET_*`, and `RAW_*`, `STORAGE_*`,
    /// `ANALYSIS_*` tier tables, each as a `_SCHEMA` + `_TABLE` pair.
    pub fn from_args(args: &JobArgs) -> Result<Self, JobError> {
        let secret_name = JobArgs::given(&args.secret_name)
            .ok_or_else(|| {
                JobError::configuration(format!("missing required option --{SECRET_NAME}"))
            })?
            .to_string();

        let mode = JobArgs::given(&args.schema_no)
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    JobError::configuration(format!("{SCHEMA_NO} must be numeric, got {raw:?}"))
                })
            })
            .transpose()?;

        let source = table_pair("SOURCE", &args.source_schema, &args.source_table)?;
        let target = table_pair("TARGET", &args.target_schema, &args.target_table)?;

        let mut tiers = BTreeMap::new();
        for (tier, schema, table) in [
            (Tier::Raw, &args.raw_schema, &args.raw_table),
            (Tier::Storage, &args.storage_schema, &args.storage_table),
            (Tier::Analysis, &args.analysis_schema, &args.analysis_table),
        ] {
            if let Some(table) = table_pair(tier.option_prefix(), schema, table)? {
                tiers.insert(tier, table);
            }
        }

        if mode.is_none() && source.is_none() && target.is_none() && tiers.is_empty() {
            return Err(JobError::configuration(
                "no tables given; pass SOURCE_*/TARGET_*, RAW_*/STORAGE_* or SCHEMA_NO with tier tables",
            ));
        }

        Ok(Self {
            secret_name,
            source,
            target,
            tiers,
            mode,
            jobnet_id: JobArgs::given(&args.jobnet_id).map(str::to_string),
        })
    }
}

/// `<PREFIX>_SCHEMA` and `<PREFIX>_TABLE` must be given together or not at all.
fn table_pair(
    prefix: &str,
    schema: &Option<String>,
    table: &Option<String>,
) -> Result<Option<TableRef>, JobError> {
    match (JobArgs::given(schema), JobArgs::given(table)) {
        (Some(schema), Some(table)) => TableRef::new(schema, table).map(Some),
        (None, None) => Ok(None),
        (Some(_), None) => Err(JobError::configuration(format!(
            "--{prefix}_SCHEMA given without --{prefix}_TABLE"
        ))),
        (None, Some(_)) => Err(JobError::configuration(format!(
            "--{prefix}_TABLE given without --{prefix}_SCHEMA"
        ))),
    }
}
