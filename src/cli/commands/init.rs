//! Implementation of the `taskpilot init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config.yaml with the defaults
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_written: Option<PathBuf>,
    pub database_path: String,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if let Some(path) = &self.config_written {
            lines.push(format!("\nWrote default configuration to {}", path.display()));
        }
        lines.push(format!("Database ready at {}", self.database_path));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let config_dir = Path::new(ConfigLoader::CONFIG_DIR);
    fs::create_dir_all(config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_path = config_dir.join("config.yaml");
    let config_written = if args.force || !config_path.exists() {
        fs::write(&config_path, ConfigLoader::default_yaml()?)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Some(config_path)
    } else {
        None
    };

    let pool = initialize_database(&config.database)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    let output_data = InitOutput {
        success: true,
        message: "Taskpilot initialized.".to_string(),
        config_written,
        database_path: config.database.path.clone(),
    };
    output(&output_data, json_mode);
    Ok(())
}
