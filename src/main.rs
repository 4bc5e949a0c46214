//! Catalog host — builds the entity catalog from the configured sources
//! and exposes it on the command line.

use clap::Parser;

mod bootstrap;
mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    bootstrap::init_logging(&config.logging);

    if let Err(e) = cli.execute(&config).await {
        tracing::error!("Command failed: {}", e);
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
