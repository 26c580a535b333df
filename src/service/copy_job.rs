use chrono::{DateTime, Utc};

use super::statements::{CopyPlan, build_statements};
use crate::db::{Connector, Session};
use crate::error::{CopyStep, JobError};
use crate::logging::{JobLogger, MessageId};
use crate::secrets::{self, SecretProvider};
use crate::types::{CopyRoute, Credentials, JobParameters, TableRef};

/// Outcome of a committed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub route: Option<CopyRoute>,
    pub source: TableRef,
    pub target: TableRef,
    pub rows_inserted: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Truncate-and-reload of one warehouse table from another.
pub struct CopyJob {
    job_name: String,
    secrets: Box<dyn SecretProvider>,
    connector: Box<dyn Connector>,
    logger: JobLogger,
}

impl CopyJob {
    pub fn new(
        job_name: impl Into<String>,
        secrets: Box<dyn SecretProvider>,
        connector: Box<dyn Connector>,
        logger: JobLogger,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            secrets,
            connector,
            logger,
        }
    }

    pub async fn fetch_credentials(&self, secret_id: &str) -> Result<Credentials, JobError> {
        secrets::fetch_credentials(self.secrets.as_ref(), secret_id).await
    }

    pub async fn open_connection(
        &self,
        creds: &Credentials,
    ) -> Result<Box<dyn Session>, JobError> {
        self.connector.connect(creds).await
    }

    /// Run the job once. Statements are built and validated before the secret
    /// store or the warehouse is touched; an opened session is always closed.
    pub async fn run(&self, params: &JobParameters) -> Result<CopyReport, JobError> {
        let log = self.logger.for_run(params.jobnet_id.as_deref());
        log.emit(MessageId::JobStart, &[&self.job_name]);

        let result = self.run_inner(&log, params).await;
        match &result {
            Ok(_) => log.emit(MessageId::JobEnd, &[&self.job_name]),
            Err(e) => log.emit(MessageId::JobFailed, &[&self.job_name, &e.code(), e]),
        }
        result
    }

    async fn run_inner(
        &self,
        log: &JobLogger,
        params: &JobParameters,
    ) -> Result<CopyReport, JobError> {
        let plan = build_statements(params)
            .inspect_err(|e| log.emit(MessageId::ConfigInvalid, &[e]))?;
        log.emit(MessageId::PlanBuilt, &[&plan.source, &plan.target]);

        log.emit(MessageId::FetchSecret, &[&params.secret_name]);
        let creds = self
            .fetch_credentials(&params.secret_name)
            .await
            .inspect_err(|e| log.emit(MessageId::SecretFailed, &[e]))?;

        log.emit(
            MessageId::Connecting,
            &[&creds.host, &creds.port, &creds.database],
        );
        let mut session = self
            .open_connection(&creds)
            .await
            .inspect_err(|e| log.emit(MessageId::ConnectFailed, &[e]))?;
        drop(creds);
        log.emit(MessageId::Connected, &[]);

        let started_at = Utc::now();
        let outcome = execute(session.as_mut(), &plan, log).await;

        if let Err(e) = session.close().await {
            log.emit(MessageId::CloseFailed, &[&e]);
        }
        drop(session);
        log.emit(MessageId::ConnectionClosed, &[]);

        let rows_inserted = outcome?;
        Ok(CopyReport {
            route: plan.route,
            source: plan.source,
            target: plan.target,
            rows_inserted,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Run the plan inside one transaction. On any failure a rollback is issued
/// and the original error is returned; the session is left open for the caller.
pub async fn execute(
    session: &mut dyn Session,
    plan: &CopyPlan,
    log: &JobLogger,
) -> Result<u64, JobError> {
    log.emit(MessageId::CopyStart, &[&plan.source, &plan.target]);

    match run_statements(session, plan).await {
        Ok(rows) => {
            log.emit(
                MessageId::CopyEnd,
                &[&plan.target.schema(), &plan.target.table()],
            );
            Ok(rows)
        }
        Err(e) => {
            log.emit(
                MessageId::CopyFailed,
                &[&plan.target.schema(), &plan.target.table(), &e],
            );
            if let Err(rollback_err) = session.rollback().await {
                log.emit(MessageId::RollbackFailed, &[&rollback_err]);
            }
            Err(e)
        }
    }
}

async fn run_statements(session: &mut dyn Session, plan: &CopyPlan) -> Result<u64, JobError> {
    session.begin().await.map_err(at(CopyStep::Begin))?;
    session
        .execute(&plan.truncate)
        .await
        .map_err(at(CopyStep::Truncate))?;
    let rows = session
        .execute(&plan.insert)
        .await
        .map_err(at(CopyStep::Insert))?;
    session.commit().await.map_err(at(CopyStep::Commit))?;
    Ok(rows)
}

fn at(step: CopyStep) -> impl FnOnce(sqlx::Error) -> JobError {
    move |source| JobError::Execution { step, source }
}
