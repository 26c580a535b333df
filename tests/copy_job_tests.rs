use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use dwh_copy::db::{Connector, Session};
use dwh_copy::error::CopyStep;
use dwh_copy::logging::JobLogger;
use dwh_copy::secrets::SecretProvider;
use dwh_copy::types::{CopyRoute, Credentials, TableRef, Tier};
use dwh_copy::{CopyJob, JobError, JobParameters};

const SECRET: &str = r#"{"username":"loader","password":"s3cret","host":"dwh.local","port":"5439","dbName":"dwh"}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    FetchSecret(String),
    Connect(String),
    Begin,
    Execute(String),
    Commit,
    Rollback,
    Close,
}

type Calls = Arc<Mutex<Vec<Call>>>;

fn record(calls: &Calls, call: Call) {
    calls.lock().expect("calls lock poisoned").push(call);
}

struct FakeSecrets {
    calls: Calls,
    payload: Result<String, ()>,
}

#[async_trait]
impl SecretProvider for FakeSecrets {
    async fn secret_string(&self, secret_id: &str) -> Result<String, JobError> {
        record(&self.calls, Call::FetchSecret(secret_id.to_string()));
        self.payload
            .clone()
            .map_err(|_| JobError::secret(secret_id, "ResourceNotFoundException"))
    }
}

#[derive(Clone, Default)]
struct Script {
    refuse_connect: bool,
    fail_on: Option<&'static str>,
    fail_rollback: bool,
}

struct FakeConnector {
    calls: Calls,
    script: Script,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, creds: &Credentials) -> Result<Box<dyn Session>, JobError> {
        record(
            &self.calls,
            Call::Connect(format!("{}:{}/{}", creds.host, creds.port, creds.database)),
        );
        if self.script.refuse_connect {
            return Err(JobError::Connection("password authentication failed".into()));
        }
        Ok(Box::new(FakeSession {
            calls: self.calls.clone(),
            script: self.script.clone(),
        }))
    }
}

struct FakeSession {
    calls: Calls,
    script: Script,
}

impl FakeSession {
    fn step(&self, call: Call, keyword: &str) -> Result<(), sqlx::Error> {
        record(&self.calls, call);
        match self.script.fail_on {
            Some(prefix) if keyword.starts_with(prefix) => {
                Err(sqlx::Error::Protocol(format!("{prefix} failed")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn begin(&mut self) -> Result<(), sqlx::Error> {
        self.step(Call::Begin, "BEGIN")
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        self.step(Call::Execute(sql.to_string()), sql).map(|_| 42)
    }

    async fn commit(&mut self) -> Result<(), sqlx::Error> {
        self.step(Call::Commit, "COMMIT")
    }

    async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        record(&self.calls, Call::Rollback);
        if self.script.fail_rollback {
            return Err(sqlx::Error::Protocol("connection reset".into()));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        record(&self.calls, Call::Close);
        Ok(())
    }
}

fn job(payload: Result<&str, ()>, script: Script) -> (CopyJob, Calls) {
    let calls: Calls = Arc::default();
    let secrets = FakeSecrets {
        calls: calls.clone(),
        payload: payload.map(str::to_string),
    };
    let connector = FakeConnector {
        calls: calls.clone(),
        script,
    };
    let job = CopyJob::new(
        "DWH_DB_DB_DATA_COPY",
        Box::new(secrets),
        Box::new(connector),
        JobLogger::default(),
    );
    (job, calls)
}

fn table(schema: &str, name: &str) -> TableRef {
    TableRef::new(schema, name).expect("valid identifiers")
}

fn orders_params() -> JobParameters {
    JobParameters::new("dwh/loader", table("raw", "orders"), table("storage", "orders"))
        .with_jobnet_id("JN0001")
}

fn calls_of(calls: &Calls) -> Vec<Call> {
    calls.lock().expect("calls lock poisoned").clone()
}

fn count(calls: &[Call], wanted: &Call) -> usize {
    calls.iter().filter(|c| *c == wanted).count()
}

#[tokio::test]
async fn successful_run_commits_then_closes_once() {
    let (job, calls) = job(Ok(SECRET), Script::default());

    let report = job.run(&orders_params()).await.expect("run should succeed");

    assert_eq!(report.source.to_string(), "raw.orders");
    assert_eq!(report.target.to_string(), "storage.orders");
    assert_eq!(report.rows_inserted, 42);
    assert!(report.finished_at >= report.started_at);

    assert_eq!(
        calls_of(&calls),
        vec![
            Call::FetchSecret("dwh/loader".into()),
            Call::Connect("dwh.local:5439/dwh".into()),
            Call::Begin,
            Call::Execute("TRUNCATE TABLE storage.orders".into()),
            Call::Execute("INSERT INTO storage.orders SELECT * FROM raw.orders".into()),
            Call::Commit,
            Call::Close,
        ]
    );
}

#[tokio::test]
async fn failed_insert_rolls_back_before_close() {
    let (job, calls) = job(
        Ok(SECRET),
        Script {
            fail_on: Some("INSERT"),
            ..Script::default()
        },
    );

    let err = job.run(&orders_params()).await.unwrap_err();
    assert!(matches!(
        err,
        JobError::Execution {
            step: CopyStep::Insert,
            ..
        }
    ));
    assert_eq!(err.code(), "E_DWH_JB_DB_DATA_COPY_001");
    assert_ne!(err.exit_status(), 0);

    let calls = calls_of(&calls);
    assert_eq!(count(&calls, &Call::Commit), 0);
    assert_eq!(count(&calls, &Call::Close), 1);
    let rollback = calls.iter().position(|c| *c == Call::Rollback).expect("rollback issued");
    let close = calls.iter().position(|c| *c == Call::Close).expect("close issued");
    assert!(rollback < close);
}

#[tokio::test]
async fn failed_truncate_skips_insert() {
    let (job, calls) = job(
        Ok(SECRET),
        Script {
            fail_on: Some("TRUNCATE"),
            ..Script::default()
        },
    );

    let err = job.run(&orders_params()).await.unwrap_err();
    assert!(matches!(
        err,
        JobError::Execution {
            step: CopyStep::Truncate,
            ..
        }
    ));

    let calls = calls_of(&calls);
    assert!(!calls.iter().any(|c| matches!(c, Call::Execute(sql) if sql.starts_with("INSERT"))));
    assert_eq!(count(&calls, &Call::Rollback), 1);
    assert_eq!(count(&calls, &Call::Close), 1);
}

#[tokio::test]
async fn failed_commit_rolls_back() {
    let (job, calls) = job(
        Ok(SECRET),
        Script {
            fail_on: Some("COMMIT"),
            ..Script::default()
        },
    );

    let err = job.run(&orders_params()).await.unwrap_err();
    assert!(matches!(
        err,
        JobError::Execution {
            step: CopyStep::Commit,
            ..
        }
    ));
    let calls = calls_of(&calls);
    assert_eq!(count(&calls, &Call::Rollback), 1);
    assert_eq!(count(&calls, &Call::Close), 1);
}

#[tokio::test]
async fn rollback_failure_keeps_original_error() {
    let (job, calls) = job(
        Ok(SECRET),
        Script {
            fail_on: Some("INSERT"),
            fail_rollback: true,
            ..Script::default()
        },
    );

    let err = job.run(&orders_params()).await.unwrap_err();
    assert!(matches!(
        err,
        JobError::Execution {
            step: CopyStep::Insert,
            ..
        }
    ));
    assert_eq!(count(&calls_of(&calls), &Call::Close), 1);
}

#[tokio::test]
async fn invalid_mode_touches_nothing() {
    let (job, calls) = job(Ok(SECRET), Script::default());
    let params = JobParameters::routed("dwh/loader", 3)
        .with_tier(Tier::Raw, table("raw", "orders"))
        .with_tier(Tier::Storage, table("storage", "orders"));

    let err = job.run(&params).await.unwrap_err();

    assert!(matches!(err, JobError::Configuration(_)));
    assert_eq!(err.exit_status(), 2);
    assert!(calls_of(&calls).is_empty());
}

#[tokio::test]
async fn secret_failure_never_connects() {
    let (job, calls) = job(Err(()), Script::default());

    let err = job.run(&orders_params()).await.unwrap_err();

    assert!(matches!(err, JobError::SecretRetrieval { .. }));
    assert_eq!(err.exit_status(), 3);
    assert_eq!(calls_of(&calls), vec![Call::FetchSecret("dwh/loader".into())]);
}

#[tokio::test]
async fn malformed_secret_never_connects() {
    let (job, calls) = job(
        Ok(r#"{"username":"loader","password":"x","host":"dwh.local","port":"54a9","dbName":"dwh"}"#),
        Script::default(),
    );

    let err = job.run(&orders_params()).await.unwrap_err();

    assert!(matches!(err, JobError::SecretRetrieval { .. }));
    assert!(!calls_of(&calls).iter().any(|c| matches!(c, Call::Connect(_))));
}

#[tokio::test]
async fn connection_failure_has_no_session_to_close() {
    let (job, calls) = job(
        Ok(SECRET),
        Script {
            refuse_connect: true,
            ..Script::default()
        },
    );

    let err = job.run(&orders_params()).await.unwrap_err();

    assert!(matches!(err, JobError::Connection(_)));
    assert_eq!(err.exit_status(), 4);
    let calls = calls_of(&calls);
    assert_eq!(count(&calls, &Call::Close), 0);
    assert_eq!(count(&calls, &Call::Begin), 0);
}

#[tokio::test]
async fn routed_storage_to_analysis_run() {
    let (job, calls) = job(Ok(SECRET), Script::default());
    let params = JobParameters::routed("dwh/loader", 2)
        .with_tier(Tier::Storage, table("storage", "orders"))
        .with_tier(Tier::Analysis, table("analysis", "orders"));

    let report = job.run(&params).await.expect("run should succeed");

    assert_eq!(report.route, Some(CopyRoute::StorageToAnalysis));
    let calls = calls_of(&calls);
    assert!(calls.contains(&Call::Execute("TRUNCATE TABLE analysis.orders".into())));
    assert!(calls.contains(&Call::Execute(
        "INSERT INTO analysis.orders SELECT * FROM storage.orders".into()
    )));
}
