//! `leadledger` - email lead ingestion for a removals CRM.
//!
//! Reads enquiry emails from a maildir spool, turns them into leads and
//! stores them in `SQLite` for review.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use leadledger_core::IngestConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadledger=info,leadledger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(IngestConfig::default_path);
    let mut config = IngestConfig::load(&config_path).await?;
    cli.apply(&mut config);
    config.validate()?;

    commands::run(cli.command, &config).await
}
