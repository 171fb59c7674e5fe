// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod args;
pub mod commands;

pub use args::ConfigArgs;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Sign recognition node CLI
#[derive(Parser, Debug)]
#[command(name = "sign-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Offline tools for the sign recognition node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a single image with the configured models
    Predict(commands::PredictArgs),

    /// Print the loaded class list
    Classes(commands::ClassesArgs),

    /// Validate and print the effective configuration
    CheckConfig(commands::CheckConfigArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Predict(args) => commands::predict(args).await,
        Commands::Classes(args) => commands::classes(args),
        Commands::CheckConfig(args) => commands::check_config(args),
    }
}
