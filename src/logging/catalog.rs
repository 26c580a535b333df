//! Coded log messages.
//!
//! Every event the job emits has a stable code and a template with positional
//! `{0}`, `{1}`, ... placeholders. Templates may be replaced per code from a TOML
//! file; replacements are checked against the message's argument count when the
//! catalog is built, so a bad template fails the run before anything happens.

use figment::{
    Figment,
    providers::{Format, Toml},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use crate::error::JobError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    JobStart,
    PlanBuilt,
    FetchSecret,
    Connecting,
    Connected,
    CopyStart,
    CopyEnd,
    ConnectionClosed,
    JobEnd,
    CopyFailed,
    JobFailed,
    ConfigInvalid,
    SecretFailed,
    ConnectFailed,
    RollbackFailed,
    CloseFailed,
}

impl MessageId {
    pub const ALL: [MessageId; 16] = [
        MessageId::JobStart,
        MessageId::PlanBuilt,
        MessageId::FetchSecret,
        MessageId::Connecting,
        MessageId::Connected,
        MessageId::CopyStart,
        MessageId::CopyEnd,
        MessageId::ConnectionClosed,
        MessageId::JobEnd,
        MessageId::CopyFailed,
        MessageId::JobFailed,
        MessageId::ConfigInvalid,
        MessageId::SecretFailed,
        MessageId::ConnectFailed,
        MessageId::RollbackFailed,
        MessageId::CloseFailed,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MessageId::JobStart => "I_DWH_JB_DB_DATA_COPY_001",
            MessageId::CopyEnd => "I_DWH_JB_DB_DATA_COPY_002",
            MessageId::JobEnd => "I_DWH_JB_DB_DATA_COPY_003",
            MessageId::Connected => "I_DWH_JB_DB_DATA_COPY_004",
            MessageId::CopyStart => "I_DWH_JB_DB_DATA_COPY_005",
            MessageId::ConnectionClosed => "I_DWH_JB_DB_DATA_COPY_006",
            MessageId::PlanBuilt => "D_DWH_JB_DB_DATA_COPY_001",
            MessageId::FetchSecret => "D_DWH_JB_DB_DATA_COPY_002",
            MessageId::Connecting => "D_DWH_JB_DB_DATA_COPY_003",
            MessageId::RollbackFailed => "W_DWH_JB_DB_DATA_COPY_001",
            MessageId::CloseFailed => "W_DWH_JB_DB_DATA_COPY_002",
            MessageId::CopyFailed => "E_DWH_JB_DB_DATA_COPY_001",
            MessageId::JobFailed => "E_DWH_JB_DB_DATA_COPY_002",
            MessageId::ConfigInvalid => "E_DWH_JB_DB_DATA_COPY_003",
            MessageId::SecretFailed => "E_DWH_JB_DB_DATA_COPY_004",
            MessageId::ConnectFailed => "E_DWH_JB_DB_DATA_COPY_005",
        }
    }

    pub fn level(self) -> Level {
        match self.code().as_bytes()[0] {
            b'D' => Level::Debug,
            b'W' => Level::Warn,
            b'E' => Level::Error,
            _ => Level::Info,
        }
    }

    /// Number of positional arguments the message is rendered with.
    pub fn arity(self) -> usize {
        match self {
            MessageId::Connected | MessageId::ConnectionClosed => 0,
            MessageId::JobStart
            | MessageId::FetchSecret
            | MessageId::JobEnd
            | MessageId::ConfigInvalid
            | MessageId::SecretFailed
            | MessageId::ConnectFailed
            | MessageId::RollbackFailed
            | MessageId::CloseFailed => 1,
            MessageId::PlanBuilt | MessageId::CopyStart | MessageId::CopyEnd => 2,
            MessageId::Connecting | MessageId::CopyFailed | MessageId::JobFailed => 3,
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            MessageId::JobStart => "Data copy job {0} started.",
            MessageId::PlanBuilt => "Copy plan resolved (source: {0}; target: {1}).",
            MessageId::FetchSecret => "Fetching warehouse credentials from secret {0}.",
            MessageId::Connecting => "Connecting to warehouse {0}:{1}/{2}.",
            MessageId::Connected => "Connected to warehouse.",
            MessageId::CopyStart => "Data copy started (source: {0}; target: {1}).",
            MessageId::CopyEnd => {
                "Data registration completed (target schema: {0}; target table: {1})."
            }
            MessageId::ConnectionClosed => "Warehouse connection closed.",
            MessageId::JobEnd => "Data copy job {0} finished successfully.",
            MessageId::CopyFailed => {
                "Data registration failed (target schema: {0}; target table: {1}): {2}"
            }
            MessageId::JobFailed => "Data copy job {0} failed with {1}: {2}",
            MessageId::ConfigInvalid => "Invalid job configuration: {0}",
            MessageId::SecretFailed => "Fetching warehouse credentials failed: {0}",
            MessageId::ConnectFailed => "Connecting to warehouse failed: {0}",
            MessageId::RollbackFailed => "Rollback failed: {0}",
            MessageId::CloseFailed => "Closing warehouse connection failed: {0}",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        MessageId::ALL.into_iter().find(|id| id.code() == code)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    templates: HashMap<MessageId, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            templates: MessageId::ALL
                .into_iter()
                .map(|id| (id, id.default_template().to_string()))
                .collect(),
        }
    }

    /// Built-in catalog with templates replaced from a `CODE = "template"` TOML file.
    pub fn with_overrides_file(path: &Path) -> Result<Self, JobError> {
        if !path.is_file() {
            return Err(JobError::configuration(format!(
                "message catalog not found: {}",
                path.display()
            )));
        }
        let overrides: HashMap<String, String> = Figment::from(Toml::file(path)).extract()?;
        Self::with_overrides(overrides)
    }

    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self, JobError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut catalog = Self::builtin();
        for (code, template) in overrides {
            let code = code.as_ref();
            let id = MessageId::from_code(code).ok_or_else(|| {
                JobError::configuration(format!("unknown message code {code:?}"))
            })?;
            let template = template.into();
            validate_template(id, &template)?;
            catalog.templates.insert(id, template);
        }
        Ok(catalog)
    }

    pub fn template(&self, id: MessageId) -> &str {
        self.templates
            .get(&id)
            .map(String::as_str)
            .unwrap_or_else(|| id.default_template())
    }

    pub fn render(&self, id: MessageId, args: &[&dyn Display]) -> String {
        render_template(self.template(id), args)
    }
}

fn validate_template(id: MessageId, template: &str) -> Result<(), JobError> {
    for index in placeholders(template) {
        if index >= id.arity() {
            return Err(JobError::configuration(format!(
                "template for {} uses {{{index}}} but the message takes {} argument(s)",
                id.code(),
                id.arity()
            )));
        }
    }
    Ok(())
}

/// Indices of every `{n}` placeholder, in order of appearance.
fn placeholders(template: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        if let Some(close) = rest.find('}')
            && let Ok(index) = rest[..close].parse::<usize>()
        {
            found.push(index);
            rest = &rest[close + 1..];
        }
    }
    found
}

/// Substitute `{n}` with `args[n]`; anything else is copied through.
pub fn render_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index = after[..close].parse::<usize>().ok()?;
            args.get(index).map(|arg| (arg, close))
        });
        match arg {
            Some((arg, close)) => {
                out.push_str(&arg.to_string());
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
