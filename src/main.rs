use std::process::ExitCode;

use clap::Parser;
use linkwatch::cli::commands;
use linkwatch::cli::{Cli, Commands};
use linkwatch::{Settings, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration.");
        Settings::default()
    });

    if cli.verbose {
        config.logging.default = "debug".to_string();
    }
    logging::init_with_config(&config.logging);

    let result = match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&config),
        Commands::Notify {
            target,
            buffer_capacity,
        } => commands::notify::run(target, buffer_capacity, &config).await,
        Commands::Serve { bind } => commands::serve::run(bind, &config).await,
        Commands::JsonDiff => commands::diff::run_json_diff().await,
        Commands::WatchDiff { url, no_reconnect } => {
            commands::diff::run_watch_diff(&url, no_reconnect, &config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
