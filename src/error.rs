use std::process::ExitCode;
use thiserror::Error as ThisError;

/// Statement of the copy that was running when an execution error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStep {
    Begin,
    Truncate,
    Insert,
    Commit,
}

impl std::fmt::Display for CopyStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CopyStep::Begin => "BEGIN",
            CopyStep::Truncate => "TRUNCATE",
            CopyStep::Insert => "INSERT",
            CopyStep::Commit => "COMMIT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, ThisError)]
pub enum JobError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Secret retrieval error for '{secret_id}': {reason}")]
    SecretRetrieval { secret_id: String, reason: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution error during {step}: {source}")]
    Execution {
        step: CopyStep,
        #[source]
        source: sqlx::Error,
    },
}

impl JobError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        JobError::Configuration(msg.into())
    }

    pub fn secret(secret_id: impl Into<String>, reason: impl ToString) -> Self {
        JobError::SecretRetrieval {
            secret_id: secret_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Distinguishing code logged before the process terminates.
    pub fn code(&self) -> &'static str {
        match self {
            JobError::Execution { .. } => "E_DWH_JB_DB_DATA_COPY_001",
            JobError::Configuration(_) => "E_DWH_JB_DB_DATA_COPY_003",
            JobError::SecretRetrieval { .. } => "E_DWH_JB_DB_DATA_COPY_004",
            JobError::Connection(_) => "E_DWH_JB_DB_DATA_COPY_005",
        }
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            JobError::Configuration(_) => 2,
            JobError::SecretRetrieval { .. } => 3,
            JobError::Connection(_) => 4,
            JobError::Execution { .. } => 5,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl From<figment::Error> for JobError {
    fn from(e: figment::Error) -> Self {
        JobError::Configuration(e.to_string())
    }
}
