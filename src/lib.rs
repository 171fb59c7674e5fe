// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod stabilizer;
pub mod version;
pub mod vision;

pub use config::{ConfigError, NodeConfig};
pub use pipeline::{
    analyze_frame, FrameAnalysis, FrameOutcome, FramePipeline, PipelineConfig, PipelineError,
};
pub use stabilizer::{SessionWindowStore, Stabilizer, StabilizerConfig, StableResult};
pub use vision::{SignModelConfig, SignModelManager};
