use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info};

use dwh_copy::config::Config;
use dwh_copy::db::PgConnector;
use dwh_copy::logging::{self, Catalog, JobLogger};
use dwh_copy::service::build_statements;
use dwh_copy::types::JobArgs;
use dwh_copy::{CopyJob, JobError, JobParameters, secrets};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            logging::init_tracing("info");
            error!(code = e.code(), error = %e, "failed to load configuration");
            return e.exit_code();
        }
    };
    logging::init_tracing(&cfg.loglevel);

    info!(
        job = %cfg.job_name,
        loglevel = %cfg.loglevel,
        secret_source = ?cfg.secret_source,
        connect_timeout_secs = cfg.connect_timeout_secs
    );

    let (job, params) = match prepare(&cfg).await {
        Ok(prepared) => prepared,
        Err(e) => {
            error!(code = e.code(), exit_status = e.exit_status(), "{e}");
            return e.exit_code();
        }
    };

    // The job logs its own failures with their codes.
    match job.run(&params).await {
        Ok(report) => {
            info!(
                source = %report.source,
                target = %report.target,
                rows = report.rows_inserted,
                elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
                "copy committed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => e.exit_code(),
    }
}

async fn prepare(cfg: &Config) -> Result<(CopyJob, JobParameters), JobError> {
    let catalog = match cfg.messages_path.as_deref() {
        Some(path) => Catalog::with_overrides_file(path)?,
        None => Catalog::builtin(),
    };

    let args = JobArgs::from_invocation(std::env::args())?;
    let params = JobParameters::from_args(&args)?;
    // Reject bad routing before the SDK is configured or anything is contacted.
    build_statements(&params)?;

    let secrets = secrets::from_config(cfg).await?;
    let connector = Box::new(PgConnector::from_config(cfg));
    let job = CopyJob::new(
        cfg.job_name.clone(),
        secrets,
        connector,
        JobLogger::new(catalog),
    );
    Ok((job, params))
}
