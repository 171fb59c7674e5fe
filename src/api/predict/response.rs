// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

use crate::pipeline::FrameOutcome;
use crate::vision::{BoundingBox, RankedLabel};

/// Hand bounding box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxDto {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl From<BoundingBox> for BoundingBoxDto {
    fn from(b: BoundingBox) -> Self {
        Self {
            x_min: b.x_min,
            y_min: b.y_min,
            x_max: b.x_max,
            y_max: b.y_max,
        }
    }
}

/// Response from POST /predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub hand_detected: bool,
    /// Top-1 label, "Uncertain" below the confidence threshold, null without a hand
    pub real_time_prediction: Option<String>,
    pub real_time_confidence: f32,
    /// Label confirmed by the session window, if any
    pub stable_prediction: Option<String>,
    pub stable_confidence: f32,
    pub should_add_to_transcript: bool,
    pub bounding_box: Option<BoundingBoxDto>,
    pub top_3_predictions: Vec<RankedLabel>,
    /// ISO-8601 local time
    pub timestamp: String,
    pub inference_time_ms: f64,
    /// Observations currently in the session window
    pub buffer_size: usize,
    pub session_id: String,
}

impl PredictResponse {
    pub fn from_outcome(outcome: FrameOutcome, session_id: String) -> Self {
        let should_add_to_transcript = outcome.should_add_to_transcript();
        Self {
            hand_detected: outcome.hand_detected,
            real_time_prediction: outcome.real_time_prediction,
            real_time_confidence: outcome.real_time_confidence,
            stable_prediction: outcome.stable.label,
            stable_confidence: outcome.stable.confidence,
            should_add_to_transcript,
            bounding_box: outcome.bounding_box.map(BoundingBoxDto::from),
            top_3_predictions: outcome.top_k,
            timestamp: chrono::Local::now().to_rfc3339(),
            inference_time_ms: outcome.inference_time_ms,
            buffer_size: outcome.buffer_size,
            session_id,
        }
    }
}
