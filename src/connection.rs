use std::{fmt, sync::Arc};

use russh::{
    client::{self, Handle},
    Disconnect,
};
use russh_sftp::{
    client::{error::Error as SftpError, SftpSession},
    protocol::StatusCode,
};

use crate::{
    config::CheckConfig,
    error::{CheckError, CheckResult},
    host_key::VerifyingHandler,
};

/// An authenticated SSH connection with an SFTP session running on it.
pub struct SftpConnection {
    handle: Handle<VerifyingHandler>,
    sftp_session: SftpSession,
}

/// What a successful probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    WorkingDirectory(String),
    Path {
        path: String,
        kind: PathKind,
        size: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeReport::WorkingDirectory(cwd) => write!(f, "working directory is {cwd}"),
            ProbeReport::Path {
                path,
                kind: PathKind::Directory,
                ..
            } => write!(f, "directory {path} exists"),
            ProbeReport::Path {
                path,
                kind: PathKind::File,
                size: Some(size),
            } => write!(f, "file {path} exists ({size} bytes)"),
            ProbeReport::Path {
                path,
                kind: PathKind::File,
                size: None,
            } => write!(f, "file {path} exists"),
        }
    }
}

impl SftpConnection {
    /// Dials the server, authenticates with the configured password and
    /// starts an SFTP session.
    pub async fn connect(config: &CheckConfig) -> CheckResult<SftpConnection> {
        let handle = connect_ssh(config).await?;
        let sftp_session = open_sftp(&handle).await?;
        Ok(SftpConnection {
            handle,
            sftp_session,
        })
    }

    /// Checks the SFTP session is usable. Without a path this only resolves
    /// the working directory, with one the path must exist.
    pub async fn probe(&self, path: Option<&str>) -> CheckResult<ProbeReport> {
        match path {
            None | Some("") => {
                tracing::info!("Retrieving working directory");
                let cwd = self
                    .sftp_session
                    .canonicalize(".")
                    .await
                    .map_err(CheckError::WorkingDirectory)?;
                Ok(ProbeReport::WorkingDirectory(cwd))
            }
            Some(path) => {
                tracing::info!(path, "Statting path");
                let metadata = self
                    .sftp_session
                    .metadata(path)
                    .await
                    .map_err(|err| map_stat_error(path, err))?;
                let kind = if metadata.is_dir() {
                    PathKind::Directory
                } else {
                    PathKind::File
                };
                Ok(ProbeReport::Path {
                    path: path.to_string(),
                    kind,
                    size: metadata.size,
                })
            }
        }
    }

    /// Ends the SSH session. Failing to say goodbye does not affect the result.
    pub async fn close(self) {
        drop(self.sftp_session);
        if let Err(err) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            tracing::debug!("Disconnect failed: {}", err);
        }
    }
}

async fn connect_ssh(config: &CheckConfig) -> CheckResult<Handle<VerifyingHandler>> {
    let address = config.socket_address();
    tracing::info!(%address, "Ssh connecting");

    let ssh_config = client::Config::default();
    let handler = VerifyingHandler::new(config.host_key.clone());

    let mut handle = client::connect(Arc::new(ssh_config), address.as_str(), handler)
        .await
        .map_err(|err| match err {
            CheckError::Ssh(source) => CheckError::Connect {
                address: address.clone(),
                source,
            },
            other => other,
        })?;

    let authenticated = handle
        .authenticate_password(config.username.as_str(), config.password.as_str())
        .await?;
    if !authenticated {
        return Err(CheckError::AuthenticationFailed);
    }
    tracing::debug!("Authenticated");

    Ok(handle)
}

async fn open_sftp(handle: &Handle<VerifyingHandler>) -> CheckResult<SftpSession> {
    tracing::info!("Sftp connecting");
    let sftp_channel = handle
        .channel_open_session()
        .await
        .map_err(CheckError::Channel)?;
    sftp_channel
        .request_subsystem(true, "sftp")
        .await
        .map_err(CheckError::SftpSubsystem)?;
    SftpSession::new(sftp_channel.into_stream())
        .await
        .map_err(CheckError::SftpSession)
}

fn map_stat_error(path: &str, err: SftpError) -> CheckError {
    match err {
        SftpError::Status(status) if matches!(status.status_code, StatusCode::NoSuchFile) => {
            CheckError::FileNotFound(path.to_string())
        }
        source => CheckError::Stat {
            path: path.to_string(),
            source,
        },
    }
}
