use clap::{CommandFactory, Parser};
use std::collections::HashSet;

use crate::error::JobError;

/// Invocation arguments in the job runner's `--NAME value` / `--NAME=value` form.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "dwh-copy", ignore_errors = true)]
pub struct JobArgs {
    #[arg(long = "SECRET_NAME")]
    pub secret_name: Option<String>,

    /// 1: raw -> storage, 2: storage -> analysis.
    #[arg(long = "SCHEMA_NO")]
    pub schema_no: Option<String>,

    #[arg(long = "JOBNET_ID")]
    pub jobnet_id: Option<String>,

    #[arg(long = "SOURCE_SCHEMA")]
    pub source_schema: Option<String>,
    #[arg(long = "SOURCE_TABLE")]
    pub source_table: Option<String>,
    #[arg(long = "TARGET_SCHEMA")]
    pub target_schema: Option<String>,
    #[arg(long = "TARGET_TABLE")]
    pub target_table: Option<String>,

    #[arg(long = "RAW_SCHEMA")]
    pub raw_schema: Option<String>,
    #[arg(long = "RAW_TABLE")]
    pub raw_table: Option<String>,
    #[arg(long = "STORAGE_SCHEMA")]
    pub storage_schema: Option<String>,
    #[arg(long = "STORAGE_TABLE")]
    pub storage_table: Option<String>,
    #[arg(long = "ANALYSIS_SCHEMA")]
    pub analysis_schema: Option<String>,
    #[arg(long = "ANALYSIS_TABLE")]
    pub analysis_table: Option<String>,
}

impl JobArgs {
    /// Parse a full argv (program name first).
    ///
    /// The runner injects options of its own (`--JOB_ID`, `--enable-metrics`, ...).
    /// clap stops at the first unknown or valueless option even with
    /// `ignore_errors`, so those are dropped before parsing.
    pub fn from_invocation<I, S>(argv: I) -> Result<Self, JobError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = Self::command();
        let known: HashSet<&str> = command
            .get_arguments()
            .filter_map(|arg| arg.get_long())
            .collect();

        let mut argv = argv.into_iter().map(Into::into).peekable();
        let program = argv.next().unwrap_or_else(|| "dwh-copy".to_string());
        let mut kept = vec![program];

        while let Some(token) = argv.next() {
            let Some(option) = token.strip_prefix("--") else {
                continue;
            };
            let (name, value) = match option.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => {
                    let takes_next = argv.peek().is_some_and(|v| !v.starts_with("--"));
                    (option, if takes_next { argv.next() } else { None })
                }
            };

            // `--NAME=value` keeps values such as `-1` from reading as flags.
            if let Some(value) = value
                && known.contains(name)
            {
                kept.push(format!("--{name}={value}"));
            }
        }

        Self::try_parse_from(kept).map_err(|e| JobError::configuration(e.to_string()))
    }

    /// `value` with blank strings treated as absent.
    pub fn given(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
