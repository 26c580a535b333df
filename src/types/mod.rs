pub mod args;
pub mod credentials;
pub mod params;
pub mod table;

pub use args::JobArgs;
pub use credentials::Credentials;
pub use params::JobParameters;
pub use table::{CopyRoute, TableRef, Tier};
