pub mod copy_job;
pub mod statements;

pub use copy_job::{CopyJob, CopyReport, execute};
pub use statements::{CopyPlan, build_statements};
