use clap::Parser;
use clipcheck_lib::bootstrap::{self, exit_status, init_tracing_subscriber, load_effective};
use clipcheck_lib::cli::Cli;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

const USAGE_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    let mut config = match load_effective(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = cli.apply_overrides(&mut config) {
        eprintln!("error: {err:#}");
        return ExitCode::from(USAGE_ERROR);
    }

    let log_dir = config.logging.directory.as_ref().map(PathBuf::from);
    if let Err(err) = init_tracing_subscriber(cli.verbose, log_dir.as_deref()) {
        eprintln!("Failed to initialize tracing: {err:#}");
        return ExitCode::FAILURE;
    }

    let result = bootstrap::run(mode, &config).await;
    match &result {
        Ok(outcome) => println!("{}", outcome.summary()),
        Err(err) => {
            error!(error = %format!("{err:#}"), "run failed");
            eprintln!("{err:#}");
        }
    }
    ExitCode::from(exit_status(&result))
}
