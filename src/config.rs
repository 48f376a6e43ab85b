use std::{fmt, time::Duration};

use clap::{ArgAction, Parser};

use crate::{
    error::{CheckError, CheckResult},
    host_key::ExpectedHostKey,
};

const DEFAULT_SSH_PORT: u16 = 22;

/// Command-line surface of the check. Every option can also be given
/// through its environment variable; flags win.
#[derive(Debug, Parser)]
#[command(name = "sftp-check", version, about = "SFTP check for monitoring")]
pub struct CheckArgs {
    /// Address of the sftp server to connect to (host[:port])
    #[arg(short = 'a', long = "sftp-address", env = "SFTP_ADDRESS", default_value = "")]
    pub address: String,

    /// Username of the sftp server to connect to
    #[arg(
        short = 'u',
        long = "sftp-username",
        env = "SFTP_USERNAME",
        hide_env_values = true,
        default_value = ""
    )]
    pub username: String,

    /// Password of the sftp server to connect to
    #[arg(
        short = 'c',
        long = "sftp-password",
        env = "SFTP_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    pub password: String,

    /// Host key or SHA256 fingerprint the server must present
    #[arg(
        short = 'k',
        long = "sftp-hostkey",
        env = "SFTP_HOSTKEY",
        hide_env_values = true,
        default_value = ""
    )]
    pub host_key: String,

    /// File path to check on the sftp server; when empty only the connection is checked
    #[arg(short = 'f', long = "sftp-filepath", env = "SFTP_FILEPATH", default_value = "")]
    pub file_path: String,

    /// Seconds the whole check may take
    #[arg(short = 't', long = "sftp-timeout", env = "SFTP_TIMEOUT", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CheckArgs {
    /// Validates the raw arguments into the configuration of one check run.
    pub fn into_config(self) -> CheckResult<CheckConfig> {
        let address = self.address.trim().to_string();
        if address.is_empty() {
            return Err(CheckError::invalid_config("sftp address must not be empty"));
        }
        validate_port(&address)?;
        if self.username.is_empty() {
            return Err(CheckError::invalid_config("sftp username must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(CheckError::invalid_config("timeout must be at least one second"));
        }
        let host_key = ExpectedHostKey::parse(&self.host_key)?;
        let file_path = Some(self.file_path.trim().to_string()).filter(|path| !path.is_empty());

        Ok(CheckConfig {
            address,
            username: self.username,
            password: self.password,
            host_key,
            file_path,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Configuration of a single check run.
#[derive(Clone)]
pub struct CheckConfig {
    pub address: String,
    pub username: String,
    pub password: String,
    pub host_key: ExpectedHostKey,
    pub file_path: Option<String>,
    pub timeout: Duration,
}

impl CheckConfig {
    /// The address to dial, with the default SSH port filled in when the
    /// configured address has none.
    pub fn socket_address(&self) -> String {
        if has_port(&self.address) {
            self.address.clone()
        } else if self.address.contains(':') && !self.address.starts_with('[') {
            // bare IPv6 literal
            format!("[{}]:{}", self.address, DEFAULT_SSH_PORT)
        } else {
            format!("{}:{}", self.address, DEFAULT_SSH_PORT)
        }
    }
}

fn has_port(address: &str) -> bool {
    let Some((host, port)) = address.rsplit_once(':') else {
        return false;
    };
    if port.parse::<u16>().is_err() {
        return false;
    }
    // "::1" splits into ":" and "1", which is an address, not a port
    !host.contains(':') || (host.starts_with('[') && host.ends_with(']'))
}

/// Rejects a `host:port` or `[addr]:port` whose port is not a number.
/// Bare IPv6 literals carry several colons and have no port to check.
fn validate_port(address: &str) -> CheckResult<()> {
    let port = if let Some(rest) = address.strip_prefix('[') {
        match rest.split_once(']') {
            Some((_, "")) => return Ok(()),
            Some((_, suffix)) => suffix.strip_prefix(':').ok_or_else(|| {
                CheckError::invalid_config(format!("malformed sftp address {address}"))
            })?,
            None => {
                return Err(CheckError::invalid_config(format!(
                    "malformed sftp address {address}"
                )))
            }
        }
    } else {
        match address.split_once(':') {
            Some((_, port)) if !port.contains(':') => port,
            _ => return Ok(()),
        }
    };

    match port.parse::<u16>() {
        Ok(_) => Ok(()),
        Err(_) => Err(CheckError::invalid_config(format!(
            "invalid port {port:?} in sftp address"
        ))),
    }
}

impl fmt::Debug for CheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckConfig")
            .field("address", &self.address)
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .field("host_key", &"<redacted>")
            .field("file_path", &self.file_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}
