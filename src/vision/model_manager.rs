// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Loading of the sign classifier, its class list and the hand detector

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::classifier::{OnnxSignClassifier, SignClassifier};
use super::hand::{HandDetector, OnnxHandDetector, DEFAULT_MIN_DETECTION_CONFIDENCE};
use super::preprocessing::DEFAULT_IMG_SIZE;

/// Where to find the models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignModelConfig {
    /// Classifier ONNX file
    pub model_path: Option<String>,
    /// One class name per line
    pub class_names_path: Option<String>,
    /// Hand landmark ONNX file
    pub hand_model_path: Option<String>,
    /// Classifier input edge length
    pub img_size: u32,
    /// Minimum hand presence score
    pub min_detection_confidence: f32,
}

impl Default for SignModelConfig {
    fn default() -> Self {
        Self {
            model_path: Some("./models/sign_classifier.onnx".to_string()),
            class_names_path: Some("./models/class_names.txt".to_string()),
            hand_model_path: Some("./models/hand_landmark.onnx".to_string()),
            img_size: DEFAULT_IMG_SIZE,
            min_detection_confidence: DEFAULT_MIN_DETECTION_CONFIDENCE,
        }
    }
}

/// Read a class list: one label per line, blank lines skipped
pub fn load_class_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read class names from {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Holds whatever models loaded successfully
///
/// Any component may be missing; the service then runs degraded and
/// reports it through the status endpoints.
pub struct SignModelManager {
    classifier: Option<Arc<dyn SignClassifier>>,
    hand_detector: Option<Arc<dyn HandDetector>>,
    class_names: Arc<Vec<String>>,
    img_size: u32,
}

impl SignModelManager {
    /// Load all configured models, logging rather than failing on errors
    pub fn load(config: &SignModelConfig) -> Self {
        let classifier: Option<Arc<dyn SignClassifier>> = match config.model_path {
            Some(ref path) => match OnnxSignClassifier::new(path) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    tracing::warn!("⚠️ Failed to load sign classifier from {}: {:#}", path, e);
                    None
                }
            },
            None => None,
        };

        let class_names = match config.class_names_path {
            Some(ref path) => match load_class_names(path) {
                Ok(names) => {
                    let preview: Vec<&str> = names.iter().take(10).map(String::as_str).collect();
                    tracing::info!("✅ Loaded {} classes: {}...", names.len(), preview.join(", "));
                    names
                }
                Err(e) => {
                    tracing::warn!("⚠️ {:#}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let hand_detector: Option<Arc<dyn HandDetector>> = match config.hand_model_path {
            Some(ref path) => match OnnxHandDetector::new(path, config.min_detection_confidence) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Failed to load hand landmark model from {}: {:#}",
                        path,
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Self {
            classifier,
            hand_detector,
            class_names: Arc::new(class_names),
            img_size: config.img_size,
        }
    }

    /// Assemble a manager from already-built collaborators
    pub fn from_parts(
        classifier: Option<Arc<dyn SignClassifier>>,
        hand_detector: Option<Arc<dyn HandDetector>>,
        class_names: Vec<String>,
        img_size: u32,
    ) -> Self {
        Self {
            classifier,
            hand_detector,
            class_names: Arc::new(class_names),
            img_size,
        }
    }

    pub fn classifier(&self) -> Option<Arc<dyn SignClassifier>> {
        self.classifier.clone()
    }

    pub fn hand_detector(&self) -> Option<Arc<dyn HandDetector>> {
        self.hand_detector.clone()
    }

    pub fn class_names(&self) -> Arc<Vec<String>> {
        self.class_names.clone()
    }

    pub fn img_size(&self) -> u32 {
        self.img_size
    }

    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_classes(&self) -> bool {
        !self.class_names.is_empty()
    }

    pub fn has_hand_detector(&self) -> bool {
        self.hand_detector.is_some()
    }

    /// Classifier input shape as text, "N/A" when no model is loaded
    pub fn model_input_description(&self) -> String {
        match self.classifier {
            Some(ref model) => format!("{:?}", model.input_shape()),
            None => "N/A".to_string(),
        }
    }
}
