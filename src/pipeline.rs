// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-frame recognition pipeline
//!
//! decode -> detect hand -> crop ROI -> classify -> stabilize.
//! A frame without a usable hand region resets the caller's window.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::stabilizer::{SessionWindowStore, StableResult};
use crate::vision::hand::DEFAULT_ROI_MARGIN;
use crate::vision::image_utils::MAX_FRAME_BYTES;
use crate::vision::preprocessing::{preprocess_roi, DEFAULT_IMG_SIZE};
use crate::vision::{
    crop_roi, decode_frame_with_limit, hand_bounding_box, rank_predictions, BoundingBox,
    HandDetector, ImageError, RankedLabel, SignClassifier,
};

/// Real-time label reported below the confidence threshold
pub const UNCERTAIN_LABEL: &str = "Uncertain";

/// Real-time label reported when the hand region is empty
pub const INVALID_HAND_LABEL: &str = "Invalid hand";

/// Default minimum confidence for a real-time label
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Number of alternatives reported per frame
pub const TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Empty file")]
    EmptyUpload,

    #[error("Invalid image: {0}")]
    InvalidImage(ImageError),

    #[error("{0} not loaded")]
    ModelUnavailable(&'static str),

    #[error("Inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}

impl From<ImageError> for PipelineError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::EmptyData => PipelineError::EmptyUpload,
            other => PipelineError::InvalidImage(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub confidence_threshold: f32,
    pub roi_margin: u32,
    pub img_size: u32,
    /// Largest frame accepted for decoding
    pub max_frame_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            roi_margin: DEFAULT_ROI_MARGIN,
            img_size: DEFAULT_IMG_SIZE,
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }
}

/// Stateless result of looking at one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAnalysis {
    NoHand,
    InvalidRegion {
        bbox: BoundingBox,
    },
    Classified {
        bbox: BoundingBox,
        label: String,
        confidence: f32,
        top_k: Vec<RankedLabel>,
    },
}

/// Everything the predict endpoint reports for a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub hand_detected: bool,
    pub real_time_prediction: Option<String>,
    pub real_time_confidence: f32,
    pub stable: StableResult,
    pub bounding_box: Option<BoundingBox>,
    pub top_k: Vec<RankedLabel>,
    pub buffer_size: usize,
    pub inference_time_ms: f64,
}

impl FrameOutcome {
    pub fn should_add_to_transcript(&self) -> bool {
        self.stable.is_stable()
    }
}

/// Real-time label for a raw prediction
pub fn real_time_label(label: &str, confidence: f32, threshold: f32) -> String {
    if confidence >= threshold {
        label.to_string()
    } else {
        UNCERTAIN_LABEL.to_string()
    }
}

/// Run detection and classification on raw upload bytes
///
/// Pure with respect to stabilizer state, so it can run on a blocking thread.
pub fn analyze_frame(
    bytes: &[u8],
    detector: &dyn HandDetector,
    classifier: &dyn SignClassifier,
    class_names: &[String],
    config: &PipelineConfig,
) -> Result<FrameAnalysis, PipelineError> {
    let (frame, info) = decode_frame_with_limit(bytes, config.max_frame_bytes)?;
    debug!("Decoded frame {}x{} ({} bytes)", info.width, info.height, info.size_bytes);

    let Some(landmarks) = detector.detect(&frame)? else {
        return Ok(FrameAnalysis::NoHand);
    };

    let Some(bbox) = hand_bounding_box(&landmarks, info.width, info.height, config.roi_margin)
    else {
        return Ok(FrameAnalysis::NoHand);
    };

    let Some(roi) = crop_roi(&frame, &bbox) else {
        return Ok(FrameAnalysis::InvalidRegion { bbox });
    };

    let input = preprocess_roi(&roi, config.img_size);
    let probabilities = classifier.classify(&input)?;
    let ranked = rank_predictions(&probabilities, class_names, TOP_K)
        .ok_or_else(|| anyhow::anyhow!("Classifier returned no scores"))?;

    Ok(FrameAnalysis::Classified {
        bbox,
        label: ranked.label,
        confidence: ranked.confidence,
        top_k: ranked.top_k,
    })
}

/// Frame processing bound to the loaded models and the session store
#[derive(Clone)]
pub struct FramePipeline {
    detector: Arc<dyn HandDetector>,
    classifier: Arc<dyn SignClassifier>,
    class_names: Arc<Vec<String>>,
    store: SessionWindowStore,
    config: PipelineConfig,
}

impl FramePipeline {
    pub fn new(
        detector: Arc<dyn HandDetector>,
        classifier: Arc<dyn SignClassifier>,
        class_names: Arc<Vec<String>>,
        store: SessionWindowStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            classifier,
            class_names,
            store,
            config,
        }
    }

    /// Process one uploaded frame for a session
    pub async fn process(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
    ) -> Result<FrameOutcome, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }

        let start = Instant::now();

        let detector = self.detector.clone();
        let classifier = self.classifier.clone();
        let class_names = self.class_names.clone();
        let config = self.config;
        let analysis = tokio::task::spawn_blocking(move || {
            analyze_frame(&bytes, detector.as_ref(), classifier.as_ref(), &class_names, &config)
        })
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))??;

        let mut outcome = self.apply(session_id, analysis).await;
        outcome.inference_time_ms = round_ms(start.elapsed().as_secs_f64() * 1000.0);
        Ok(outcome)
    }

    /// Fold a frame analysis into the session window
    pub async fn apply(&self, session_id: &str, analysis: FrameAnalysis) -> FrameOutcome {
        match analysis {
            FrameAnalysis::NoHand => {
                self.store.reset(session_id).await;
                FrameOutcome {
                    hand_detected: false,
                    real_time_prediction: None,
                    real_time_confidence: 0.0,
                    stable: StableResult::none(),
                    bounding_box: None,
                    top_k: Vec::new(),
                    buffer_size: 0,
                    inference_time_ms: 0.0,
                }
            }
            FrameAnalysis::InvalidRegion { bbox } => {
                self.store.reset(session_id).await;
                FrameOutcome {
                    hand_detected: true,
                    real_time_prediction: Some(INVALID_HAND_LABEL.to_string()),
                    real_time_confidence: 0.0,
                    stable: StableResult::none(),
                    bounding_box: Some(bbox),
                    top_k: Vec::new(),
                    buffer_size: 0,
                    inference_time_ms: 0.0,
                }
            }
            FrameAnalysis::Classified {
                bbox,
                label,
                confidence,
                top_k,
            } => {
                let real_time =
                    real_time_label(&label, confidence, self.config.confidence_threshold);
                let (stable, buffer_size) = self
                    .store
                    .observe_and_read(session_id, &label, confidence)
                    .await;

                debug!(
                    "Session {}: {} ({:.3}) stable={:?} buffer={}",
                    session_id, label, confidence, stable.label, buffer_size
                );

                FrameOutcome {
                    hand_detected: true,
                    real_time_prediction: Some(real_time),
                    real_time_confidence: confidence,
                    stable,
                    bounding_box: Some(bbox),
                    top_k,
                    buffer_size,
                    inference_time_ms: 0.0,
                }
            }
        }
    }
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
