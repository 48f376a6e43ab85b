use clap::Parser;
use sftp_check::{logging::init_logging, run_check, CheckArgs, CheckOutcome};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CheckArgs::parse();
    init_logging(args.verbose);

    let outcome = match args.into_config() {
        Ok(config) => {
            tracing::debug!(?config, "Loaded configuration");
            run_check(&config).await
        }
        Err(err) => CheckOutcome::from(err),
    };
    outcome.exit()
}
