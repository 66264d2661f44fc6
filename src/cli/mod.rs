//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::errors::DomainError;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(name = "taskpilot")]
#[command(about = "Natural-language commands for a personal GTD task store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .taskpilot/config.yaml and local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the configuration directory and database
    Init(commands::init::InitArgs),

    /// Interpret and run one natural-language command
    Ask(commands::ask::AskArgs),
}

impl Cli {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}

/// Print a failure and exit non-zero. Domain errors are reduced to their
/// public message; anything else shows its context chain.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let message = match err.downcast_ref::<DomainError>() {
        Some(domain) => {
            tracing::error!(error = %domain, "command failed");
            domain.public_message()
        }
        None => format!("{err:#}"),
    };

    if json_mode {
        eprintln!("{}", serde_json::json!({ "error": message }));
    } else {
        eprintln!("Error: {message}");
    }
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "taskpilot",
            "ask",
            "--user",
            "6f1c2a52-8a4e-4d1b-9a3e-0b9f5d1e2c3a",
            "remind",
            "me",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.prompt.join(" "), "remind me");
    }

    #[test]
    fn test_ask_requires_a_prompt() {
        assert!(Cli::try_parse_from(["taskpilot", "ask", "--user", "u"]).is_err());
    }
}
