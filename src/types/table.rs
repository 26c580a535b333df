use std::fmt;

use crate::error::JobError;

/// Redshift rejects identifiers longer than this many bytes.
pub const MAX_IDENTIFIER_LEN: usize = 127;

/// Schema layer of the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Raw,
    Storage,
    Analysis,
}

impl Tier {
    /// Prefix of the `<PREFIX>_SCHEMA` / `<PREFIX>_TABLE` invocation options.
    pub fn option_prefix(self) -> &'static str {
        match self {
            Tier::Raw => "RAW",
            Tier::Storage => "STORAGE",
            Tier::Analysis => "ANALYSIS",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Raw => "raw",
            Tier::Storage => "storage",
            Tier::Analysis => "analysis",
        })
    }
}

/// Tier-to-tier routing chosen by the `SCHEMA_NO` mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyRoute {
    RawToStorage,
    StorageToAnalysis,
}

impl CopyRoute {
    pub fn from_mode(mode: i64) -> Result<Self, JobError> {
        match mode {
            1 => Ok(CopyRoute::RawToStorage),
            2 => Ok(CopyRoute::StorageToAnalysis),
            other => Err(JobError::configuration(format!(
                "SCHEMA_NO must be 1 (raw->storage) or 2 (storage->analysis), got {other}"
            ))),
        }
    }

    pub fn source_tier(self) -> Tier {
        match self {
            CopyRoute::RawToStorage => Tier::Raw,
            CopyRoute::StorageToAnalysis => Tier::Storage,
        }
    }

    pub fn target_tier(self) -> Tier {
        match self {
            CopyRoute::RawToStorage => Tier::Storage,
            CopyRoute::StorageToAnalysis => Tier::Analysis,
        }
    }
}

/// A validated `schema.table` pair, safe to interpolate into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    schema: String,
    table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self, JobError> {
        let schema = schema.into();
        let table = table.into();
        validate_identifier("schema", &schema)?;
        validate_identifier("table", &table)?;
        Ok(Self { schema, table })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Allow-list: `[A-Za-z_][A-Za-z0-9_$]*`, at most [`MAX_IDENTIFIER_LEN`] bytes.
pub fn validate_identifier(kind: &str, ident: &str) -> Result<(), JobError> {
    let mut chars = ident.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if !first_ok || !rest_ok {
        return Err(JobError::configuration(format!(
            "invalid {kind} identifier {ident:?}"
        )));
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(JobError::configuration(format!(
            "{kind} identifier exceeds {MAX_IDENTIFIER_LEN} bytes: {ident:?}"
        )));
    }
    Ok(())
}
