pub mod check;
pub mod config;
pub mod connection;
pub mod error;
pub mod host_key;
pub mod logging;
pub mod status;

pub use check::run_check;
pub use config::{CheckArgs, CheckConfig};
pub use error::{CheckError, CheckResult};
pub use status::{CheckOutcome, ServiceState};
