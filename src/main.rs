//! Taskpilot CLI entry point.

use clap::Parser;

use taskpilot::cli::{handle_error, Cli, Commands};
use taskpilot::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Keeps the file writer alive until exit.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => taskpilot::cli::commands::init::execute(args, &config, cli.json).await,
        Commands::Ask(args) => taskpilot::cli::commands::ask::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
