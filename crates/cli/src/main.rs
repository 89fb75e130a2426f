// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `wharf` - control-plane agent and inventory sync CLI

mod commands;
mod config;
mod exit_error;
mod logging;
mod signals;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wharf", version, about = "Control-plane agent and sync toolkit")]
struct Cli {
    /// Path to the config file (default: ./wharf.toml or WHARF_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the job agent against the control plane
    Agent(commands::agent::AgentArgs),
    /// Sync third-party inventory into the control plane
    Sync(commands::sync::SyncArgs),
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("wharf: {error}");
        std::process::exit(error.code());
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let config = config::Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Agent(args) => commands::agent::run(args, config).await,
        Command::Sync(args) => commands::sync::run(args, config).await,
    }
}
