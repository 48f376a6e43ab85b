//! Server host key verification.
//!
//! The expected key is supplied either as an OpenSSH style SHA256
//! fingerprint or as the public key itself; both are reduced to a
//! fingerprint and compared against the key the server presents during the
//! handshake.

use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;

use crate::error::{CheckError, CheckResult};

const FINGERPRINT_PREFIX: &str = "SHA256:";
// unpadded base64 of a 32 byte digest
const FINGERPRINT_LEN: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedHostKey {
    /// No key configured, whatever the server offers is accepted.
    Any,
    /// Unpadded base64 SHA256 fingerprint, without the `SHA256:` prefix.
    Fingerprint(String),
}

impl ExpectedHostKey {
    pub fn parse(value: &str) -> CheckResult<ExpectedHostKey> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(ExpectedHostKey::Any);
        }

        if let Some(fingerprint) = value.strip_prefix(FINGERPRINT_PREFIX) {
            return normalize_fingerprint(fingerprint)
                .map(ExpectedHostKey::Fingerprint)
                .ok_or_else(|| {
                    CheckError::invalid_config(format!("malformed host key fingerprint {value}"))
                });
        }

        let fields: Vec<&str> = value.split_whitespace().collect();
        let blob = match fields.as_slice() {
            [single] => {
                if let Some(fingerprint) = normalize_fingerprint(single) {
                    return Ok(ExpectedHostKey::Fingerprint(fingerprint));
                }
                *single
            }
            // "<algorithm> <blob> [comment]" as found in known_hosts and .pub files
            [_algorithm, blob, ..] => *blob,
            [] => return Ok(ExpectedHostKey::Any),
        };

        let key = russh_keys::parse_public_key_base64(blob).map_err(|err| {
            CheckError::invalid_config(format!("unrecognized host key: {err}"))
        })?;
        Ok(ExpectedHostKey::Fingerprint(key.fingerprint()))
    }

    /// Compares the server key against the expectation.
    pub fn verify(&self, server_key: &PublicKey) -> CheckResult<()> {
        let actual = server_key.fingerprint();
        match self {
            ExpectedHostKey::Any => {
                tracing::warn!(
                    fingerprint = %display_fingerprint(&actual),
                    "no host key configured, accepting server key unverified"
                );
                Ok(())
            }
            ExpectedHostKey::Fingerprint(expected) if *expected == actual => {
                tracing::debug!(fingerprint = %display_fingerprint(&actual), "host key verified");
                Ok(())
            }
            ExpectedHostKey::Fingerprint(expected) => Err(CheckError::HostKeyMismatch {
                expected: display_fingerprint(expected),
                actual: display_fingerprint(&actual),
            }),
        }
    }
}

fn normalize_fingerprint(value: &str) -> Option<String> {
    let trimmed = value.trim_end_matches('=');
    let is_base64 = trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/');
    (trimmed.len() == FINGERPRINT_LEN && is_base64).then(|| trimmed.to_string())
}

fn display_fingerprint(fingerprint: &str) -> String {
    format!("{FINGERPRINT_PREFIX}{fingerprint}")
}

/// SSH client handler that checks the server key against the configured one.
#[derive(Debug)]
pub struct VerifyingHandler {
    expected: ExpectedHostKey,
}

impl VerifyingHandler {
    pub fn new(expected: ExpectedHostKey) -> Self {
        VerifyingHandler { expected }
    }
}

#[async_trait]
impl client::Handler for VerifyingHandler {
    type Error = CheckError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        self.expected.verify(server_public_key)?;
        Ok(true)
    }
}
