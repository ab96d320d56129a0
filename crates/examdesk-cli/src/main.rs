//! Examdesk CLI
//!
//! Study assistant: ask a generative model with API key fallback, and
//! search uploaded exam documents.

use anyhow::Result;
use clap::Parser;
use examdesk_core::{Config, DocumentStore, ExamDeskError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<ExamDeskError>()
            .map(ExamDeskError::exit_code)
            .unwrap_or(examdesk_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // EXAMDESK_CONFIG / EXAMDESK_STORE override the platform defaults
    let config_path = Config::default_path();
    let store_path = DocumentStore::default_path();

    match cli.command {
        Commands::Keys(args) => {
            let mut config = Config::load_from(&config_path)?;
            commands::keys::run(args, &mut config, &config_path, cli.format).await
        }
        Commands::Ask(args) => {
            let mut config = Config::load_from(&config_path)?;
            commands::ask::run(args, &mut config, &config_path, cli.format).await
        }
        Commands::Docs(args) => commands::docs::run(args, &store_path, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &store_path, cli.format).await,
        Commands::Suggest(args) => {
            commands::search::run_suggest(args, &store_path, cli.format).await
        }
        Commands::Filters => commands::search::run_filters(&store_path, cli.format).await,
    }
}
