use std::time::Duration;

use thiserror::Error;

use crate::status::ServiceState;

/// Everything that can go wrong while running the check.
///
/// Doubles as the error type of the SSH client handler, which is why it
/// converts from [`russh::Error`].
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: russh::Error,
    },

    #[error("host key mismatch: expected {expected}, server offered {actual}")]
    HostKeyMismatch { expected: String, actual: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("could not open session channel: {0}")]
    Channel(#[source] russh::Error),

    #[error("server refused the sftp subsystem: {0}")]
    SftpSubsystem(#[source] russh::Error),

    #[error("could not start sftp session: {0}")]
    SftpSession(#[source] russh_sftp::client::error::Error),

    #[error("could not retrieve working directory: {0}")]
    WorkingDirectory(#[source] russh_sftp::client::error::Error),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("could not stat {path}: {source}")]
    Stat {
        path: String,
        #[source]
        source: russh_sftp::client::error::Error,
    },

    #[error("check timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),
}

impl CheckError {
    /// The monitoring state this error is reported as.
    pub fn service_state(&self) -> ServiceState {
        match self {
            CheckError::InvalidConfig(_) => ServiceState::Unknown,
            _ => ServiceState::Critical,
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        CheckError::InvalidConfig(message.into())
    }
}

pub type CheckResult<T> = Result<T, CheckError>;
