// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line flags / environment variables (applied by the binaries).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::{PipelineConfig, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::stabilizer::{
    StabilizerConfig, StabilizerError, StoreConfig, DEFAULT_MIN_VOTES, DEFAULT_STABLE_THRESHOLD,
    DEFAULT_WINDOW_SIZE,
};
use crate::vision::hand::DEFAULT_ROI_MARGIN;
use crate::vision::image_utils::MAX_FRAME_BYTES;
use crate::vision::SignModelConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error(transparent)]
    Stabilizer(#[from] StabilizerError),
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: MAX_FRAME_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum confidence for a real-time label
    pub confidence_threshold: f32,
    /// Minimum mean confidence for a stable label
    pub stable_threshold: f32,
    pub window_size: usize,
    pub min_votes: usize,
    /// Pixels added around the hand landmarks
    pub roi_margin: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            stable_threshold: DEFAULT_STABLE_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            min_votes: DEFAULT_MIN_VOTES,
            roi_margin: DEFAULT_ROI_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub models: SignModelConfig,
    pub thresholds: ThresholdConfig,
    pub sessions: SessionSettings,
}

/// Session store settings (serde-friendly mirror of [`StoreConfig`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub max_sessions: usize,
    pub session_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            max_sessions: store.max_sessions,
            session_ttl_secs: store.session_ttl_secs,
            cleanup_interval_secs: store.cleanup_interval_secs,
        }
    }
}

impl NodeConfig {
    /// Load a TOML file; missing sections fall back to defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }

    pub fn stabilizer(&self) -> StabilizerConfig {
        StabilizerConfig {
            window_size: self.thresholds.window_size,
            min_votes: self.thresholds.min_votes,
            stable_threshold: self.thresholds.stable_threshold,
        }
    }

    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            max_sessions: self.sessions.max_sessions,
            session_ttl_secs: self.sessions.session_ttl_secs,
            cleanup_interval_secs: self.sessions.cleanup_interval_secs,
        }
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            confidence_threshold: self.thresholds.confidence_threshold,
            roi_margin: self.thresholds.roi_margin,
            img_size: self.models.img_size,
            max_frame_bytes: self.server.max_upload_bytes,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stabilizer().validate()?;

        if !(0.0..=1.0).contains(&self.thresholds.confidence_threshold) {
            return Err(invalid(
                "confidence_threshold",
                format!("must be within [0, 1], got {}", self.thresholds.confidence_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.models.min_detection_confidence) {
            return Err(invalid(
                "min_detection_confidence",
                format!("must be within [0, 1], got {}", self.models.min_detection_confidence),
            ));
        }
        if self.models.img_size == 0 {
            return Err(invalid("img_size", "must be greater than 0"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes", "must be greater than 0"));
        }
        if self.sessions.max_sessions == 0 {
            return Err(invalid("max_sessions", "must be greater than 0"));
        }

        Ok(())
    }
}
