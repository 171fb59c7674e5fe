// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::args::ConfigArgs;
use crate::pipeline::{analyze_frame, real_time_label, FrameAnalysis};
use crate::vision::{load_class_names, RankedLabel, SignModelManager};

/// Arguments for the predict command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image to classify
    pub image: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the classes command
#[derive(Args, Debug)]
pub struct ClassesArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the check-config command
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Single-image result printed by `predict`
#[derive(Debug, Clone, Serialize)]
pub struct OfflinePrediction {
    pub image: String,
    pub hand_detected: bool,
    pub prediction: Option<String>,
    pub confidence: f32,
    pub top_3_predictions: Vec<RankedLabel>,
}

impl OfflinePrediction {
    pub fn from_analysis(
        image: String,
        analysis: FrameAnalysis,
        confidence_threshold: f32,
    ) -> Self {
        match analysis {
            FrameAnalysis::NoHand => Self {
                image,
                hand_detected: false,
                prediction: None,
                confidence: 0.0,
                top_3_predictions: Vec::new(),
            },
            FrameAnalysis::InvalidRegion { .. } => Self {
                image,
                hand_detected: true,
                prediction: None,
                confidence: 0.0,
                top_3_predictions: Vec::new(),
            },
            FrameAnalysis::Classified {
                label,
                confidence,
                top_k,
                ..
            } => Self {
                image,
                hand_detected: true,
                prediction: Some(real_time_label(&label, confidence, confidence_threshold)),
                confidence,
                top_3_predictions: top_k,
            },
        }
    }
}

pub async fn predict(args: PredictArgs) -> Result<()> {
    let config = args.config.load()?;
    let models = SignModelManager::load(&config.models);

    let classifier = models
        .classifier()
        .ok_or_else(|| anyhow!("Model not loaded"))?;
    let detector = models
        .hand_detector()
        .ok_or_else(|| anyhow!("Hand detector not loaded"))?;
    let class_names = models.class_names();
    if class_names.is_empty() {
        return Err(anyhow!("Classes not loaded"));
    }

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    info!("Classifying {} ({} bytes)", args.image.display(), bytes.len());

    let pipeline_config = config.pipeline();
    let analysis = tokio::task::spawn_blocking(move || {
        analyze_frame(
            &bytes,
            detector.as_ref(),
            classifier.as_ref(),
            &class_names,
            &pipeline_config,
        )
    })
    .await??;

    let result = OfflinePrediction::from_analysis(
        args.image.display().to_string(),
        analysis,
        config.thresholds.confidence_threshold,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match &result.prediction {
        Some(label) => {
            println!("Prediction: {} ({:.1}%)", label, result.confidence * 100.0);
            for (rank, alt) in result.top_3_predictions.iter().enumerate() {
                println!("  {}. {} ({:.1}%)", rank + 1, alt.class, alt.confidence * 100.0);
            }
        }
        None if result.hand_detected => println!("Hand region was empty"),
        None => println!("No hand detected"),
    }
    Ok(())
}

pub fn classes(args: ClassesArgs) -> Result<()> {
    let config = args.config.load()?;
    let path = config
        .models
        .class_names_path
        .ok_or_else(|| anyhow!("No class names path configured"))?;
    let names = load_class_names(&path)?;

    println!("{} classes from {}", names.len(), path);
    for (index, name) in names.iter().enumerate() {
        println!("{:>4}  {}", index, name);
    }
    Ok(())
}

pub fn check_config(args: CheckConfigArgs) -> Result<()> {
    let config = args.config.load()?;
    println!("{}", toml::to_string_pretty(&config)?);
    println!("# configuration OK");
    Ok(())
}
