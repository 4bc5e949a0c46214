//! Host command definitions and dispatch.

pub mod categories;
pub mod list;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::bootstrap;
use crate::output::OutputFormat;
use catalog_core::config::AppConfig;
use catalog_core::error::AppError;

/// Catalog host — merged view over every configured entity source
#[derive(Debug, Parser)]
#[command(name = "catalog-host", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay, loaded from `config/{env}`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Extra descriptor file to register as a source (repeatable)
    #[arg(short, long = "source", value_name = "PATH")]
    pub sources: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List catalog entities
    List(list::ListArgs),
    /// Run an entity's primary action
    Run(run::RunArgs),
    /// Show the context menu and settings entries of an entity
    Menu(run::RunArgs),
    /// List registered categories
    Categories,
}

impl Cli {
    /// Load configuration from the selected files and the environment
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &format!("config/{}", self.env))
    }

    /// Execute the command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let catalog = bootstrap::build_catalog(config, &self.sources).await;

        match &self.command {
            Commands::List(args) => list::execute(args, &catalog, self.format),
            Commands::Run(args) => run::execute(args, &catalog).await,
            Commands::Menu(args) => run::menu(args, &catalog, self.format),
            Commands::Categories => categories::execute(&catalog, self.format),
        }
    }
}
