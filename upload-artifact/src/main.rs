use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use upload_artifact::cli::{run, Cli};
use upload_artifact::report::WorkflowReporter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr; stdout is reserved for workflow commands.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    let reporter = WorkflowReporter::stdout_from_env();
    let outcome = run(cli, &reporter).await;

    if reporter.is_failed() {
        tracing::error!(?outcome, "CLI exited with a failed job");
        ExitCode::FAILURE
    } else {
        tracing::info!(?outcome, "CLI completed successfully");
        ExitCode::SUCCESS
    }
}
