pub mod cli;
pub mod commands;
pub mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::core::error::LauncherResult;

pub async fn run() -> LauncherResult<()> {
    let args = CliArgs::parse();

    // Initialize structured logging
    let default_filter = match args.verbose {
        0 => "info,onlyus_launcher=debug",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("OnlyUs launcher starting...");

    args.command.run(args.base_dir).await
}
