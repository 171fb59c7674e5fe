// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sign classifier
//!
//! Wraps a pretrained image classifier exported to ONNX. The network itself
//! is opaque: it takes a square RGB tensor and returns one probability per
//! class.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::onnx::{first_input_name, load_cpu_session};

/// Label used when the model predicts an index past the class list
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A class with its probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub class: String,
    pub confidence: f32,
}

/// Top prediction plus alternatives for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
    pub index: usize,
    pub top_k: Vec<RankedLabel>,
}

/// Produces class probabilities for a preprocessed ROI tensor
#[cfg_attr(test, mockall::automock)]
pub trait SignClassifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>>;

    /// Input shape the model expects, for status reporting
    fn input_shape(&self) -> Vec<i64> {
        Vec::new()
    }
}

/// Rank probabilities against the class list
///
/// Returns `None` for an empty probability vector.
pub fn rank_predictions(
    probabilities: &[f32],
    class_names: &[String],
    k: usize,
) -> Option<Classification> {
    if probabilities.is_empty() {
        return None;
    }

    let label_for = |i: usize| -> String {
        class_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    };

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // Stable sort keeps the lower index first on equal probabilities
    order.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let index = order[0];
    let top_k = order
        .iter()
        .take(k)
        .map(|&i| RankedLabel {
            class: label_for(i),
            confidence: probabilities[i],
        })
        .collect();

    Some(Classification {
        label: label_for(index),
        confidence: probabilities[index],
        index,
        top_k,
    })
}

/// ONNX classifier session (CPU)
#[derive(Clone)]
pub struct OnnxSignClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_shape: Vec<i64>,
}

impl std::fmt::Debug for OnnxSignClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSignClassifier")
            .field("input_name", &self.input_name)
            .field("input_shape", &self.input_shape)
            .finish_non_exhaustive()
    }
}

impl OnnxSignClassifier {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading sign classifier from {}", model_path.display());

        let session = load_cpu_session(model_path, 4)?;
        let input_name = first_input_name(&session, "input_1");
        let input_shape = session
            .inputs
            .first()
            .and_then(|input| input.input_type.tensor_shape())
            .map(|shape| shape.iter().copied().collect())
            .unwrap_or_default();

        info!(
            "✅ Sign classifier loaded - input '{}' {:?}",
            input_name, input_shape
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_shape,
        })
    }
}

impl SignClassifier for OnnxSignClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let shape = input.shape();
        if shape.len() != 4 || shape[0] != 1 || shape[3] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, H, W, 3]", shape);
        }

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Classifier session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Classifier inference failed")?;

        let probabilities: Vec<f32> = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?
            .iter()
            .copied()
            .collect();

        debug!("Classifier produced {} scores", probabilities.len());
        Ok(probabilities)
    }

    fn input_shape(&self) -> Vec<i64> {
        self.input_shape.clone()
    }
}
