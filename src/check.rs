use tokio::time;

use crate::{
    config::CheckConfig,
    connection::{ProbeReport, SftpConnection},
    error::{CheckError, CheckResult},
    status::CheckOutcome,
};

/// Runs the whole check once: connect, probe, disconnect. Every failure,
/// including running out of time, is folded into the returned outcome.
pub async fn run_check(config: &CheckConfig) -> CheckOutcome {
    let result = match time::timeout(config.timeout, connect_and_probe(config)).await {
        Ok(result) => result,
        Err(_) => Err(CheckError::Timeout(config.timeout)),
    };

    match result {
        Ok(report) => {
            tracing::info!("Done");
            CheckOutcome::ok(report.to_string())
        }
        Err(err) => {
            tracing::error!("Check failed: {}", err);
            CheckOutcome::from(err)
        }
    }
}

async fn connect_and_probe(config: &CheckConfig) -> CheckResult<ProbeReport> {
    let connection = SftpConnection::connect(config).await?;
    let report = connection.probe(config.file_path.as_deref()).await;
    connection.close().await;
    report
}
