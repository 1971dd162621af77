//! # Stockbridge Admin
//!
//! Operator tool for a Stockbridge deployment.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          stockbridge-admin                              │
//! │                                                                         │
//! │  argv ───► clap ───► SyncConfig::load ───► StateClient::connect        │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │                         journal / snapshots / locks / catalog keys     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Never calls a store API: manual reconciliation runs inside the engine
//! process, which owns the adapters.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stockbridge_sync::SyncConfig;

use crate::cli::{Cli, Command};
use crate::commands::Admin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::InitConfig {
            primary_location,
            secondary_location,
            force,
        } => commands::init_config(cli.config, primary_location, secondary_location, force, &mut stdout),
        command => {
            let config = SyncConfig::load(cli.config).context("loading configuration")?;
            let admin = Admin::connect(config).await?;
            admin.run(command, cli.json, &mut stdout).await
        }
    }
}
