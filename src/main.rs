// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use sign_recognition_node::{
    api::{start_server, AppState},
    cli::ConfigArgs,
    version,
    vision::SignModelManager,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ASL/FSL sign recognition HTTP node
#[derive(Parser, Debug)]
#[command(name = "sign-node")]
#[command(version = version::VERSION_NUMBER)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);
    info!("✨ Features: {}", version::FEATURES.join(", "));

    let args = Args::parse();
    let config = args.config.load()?;

    info!(
        "Thresholds: confidence={}, stable={}, window={} (min votes {})",
        config.thresholds.confidence_threshold,
        config.thresholds.stable_threshold,
        config.thresholds.window_size,
        config.thresholds.min_votes
    );

    let models = SignModelManager::load(&config.models);
    if !models.has_model() {
        warn!("⚠️ Sign classifier not loaded, /predict will return 503");
    }
    if !models.has_classes() {
        warn!("⚠️ Class names not loaded, /classes and /predict will return 503");
    }
    if !models.has_hand_detector() {
        warn!("⚠️ Hand detector not loaded, /predict will return 503");
    }

    let state = AppState::new(models, config)?;
    start_server(state).await?;

    info!("Node stopped");
    Ok(())
}
