//! symbench CLI entry point.
//!
//! Initializes logging and delegates to the CLI module for command handling.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first to get log_level
    let cli = symbench::cli::parse_cli();

    // Priority: RUST_LOG env var > --log-level CLI arg > default "info";
    // --verbose raises the CLI default to debug.
    let cli_filter = if cli.verbose && cli.log_level == "info" {
        "debug".to_string()
    } else {
        cli.log_level.clone()
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli_filter)))
        .init();

    symbench::cli::run_with_cli(cli).await
}
