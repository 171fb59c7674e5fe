// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::NodeConfig;

/// Configuration flags shared by `sign-node` and `sign-cli`
///
/// Every flag can also be set through its environment variable and wins
/// over the TOML file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a TOML config file
    #[arg(long, env = "SIGN_NODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    /// Port for the HTTP server
    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,

    /// Sign classifier ONNX model
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<String>,

    /// Class names file, one label per line
    #[arg(long, env = "CLASS_NAMES_PATH")]
    pub class_names_path: Option<String>,

    /// Hand landmark ONNX model
    #[arg(long, env = "HAND_MODEL_PATH")]
    pub hand_model_path: Option<String>,

    /// Minimum confidence for a real-time label
    #[arg(long, env = "CONFIDENCE_THRESHOLD")]
    pub confidence_threshold: Option<f32>,

    /// Minimum mean confidence for a stable label
    #[arg(long, env = "STABLE_THRESHOLD")]
    pub stable_threshold: Option<f32>,
}

impl ConfigArgs {
    /// Build the effective configuration: defaults, file, then flags
    pub fn load(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config from {}", path.display());
                NodeConfig::from_toml_file(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            }
            None => NodeConfig::default(),
        };
        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut NodeConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = &self.model_path {
            config.models.model_path = Some(path.clone());
        }
        if let Some(path) = &self.class_names_path {
            config.models.class_names_path = Some(path.clone());
        }
        if let Some(path) = &self.hand_model_path {
            config.models.hand_model_path = Some(path.clone());
        }
        if let Some(threshold) = self.confidence_threshold {
            config.thresholds.confidence_threshold = threshold;
        }
        if let Some(threshold) = self.stable_threshold {
            config.thresholds.stable_threshold = threshold;
        }
    }
}
