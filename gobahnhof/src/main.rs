use std::process::ExitCode;

use gobahnhof::{config, init_logging_from_env, Config};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging_from_env() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let path = config::config_path(std::env::args_os().nth(1));
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    match gobahnhof::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bridge stopped");
            ExitCode::FAILURE
        }
    }
}
