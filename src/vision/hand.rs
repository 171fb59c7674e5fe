// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hand localisation
//!
//! The landmark model is a black box behind [`HandDetector`]; this module
//! only turns its normalized landmarks into a pixel bounding box and crops
//! the region of interest.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use image::imageops;
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::onnx::{first_input_name, load_cpu_session};
use super::preprocessing::letterbox;

/// Pixels added around the landmark extents
pub const DEFAULT_ROI_MARGIN: u32 = 30;

/// Default minimum hand presence score
pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.6;

/// Landmark model input edge length
pub const LANDMARK_INPUT_SIZE: u32 = 224;

/// A landmark in normalized image coordinates (0..1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// Landmarks of a single detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: Vec<Landmark>,
    /// Hand presence score reported by the detector
    pub score: f32,
}

/// Pixel bounding box, `x_max`/`y_max` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> u32 {
        self.y_max.saturating_sub(self.y_min)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Locates at most one hand in a frame
#[cfg_attr(test, mockall::automock)]
pub trait HandDetector: Send + Sync {
    fn detect(&self, frame: &RgbImage) -> Result<Option<HandLandmarks>>;
}

/// Bounding box around the landmarks, widened by `margin` and clamped to the frame
pub fn hand_bounding_box(
    landmarks: &HandLandmarks,
    width: u32,
    height: u32,
    margin: u32,
) -> Option<BoundingBox> {
    if landmarks.points.is_empty() {
        return None;
    }

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for p in &landmarks.points {
        let px = p.x * width as f32;
        let py = p.y * height as f32;
        min_x = min_x.min(px);
        min_y = min_y.min(py);
        max_x = max_x.max(px);
        max_y = max_y.max(py);
    }

    let margin = margin as f32;
    let clamp = |v: f32, hi: u32| -> u32 { (v.trunc().max(0.0) as u32).min(hi) };

    Some(BoundingBox {
        x_min: clamp(min_x - margin, width),
        y_min: clamp(min_y - margin, height),
        x_max: clamp(max_x + margin, width),
        y_max: clamp(max_y + margin, height),
    })
}

/// Crop the hand region; `None` when the box has no area
pub fn crop_roi(frame: &RgbImage, bbox: &BoundingBox) -> Option<RgbImage> {
    if bbox.is_empty() {
        return None;
    }
    Some(imageops::crop_imm(frame, bbox.x_min, bbox.y_min, bbox.width(), bbox.height()).to_image())
}

/// ONNX hand landmark model (21 keypoints, MediaPipe layout)
///
/// Expects an NHWC `[1, 224, 224, 3]` input scaled to 0..1 and produces a
/// `[1, 63]` landmark tensor (x, y, z in input pixels) followed by a
/// `[1, 1]` hand presence score.
#[derive(Clone)]
pub struct OnnxHandDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    min_confidence: f32,
}

impl std::fmt::Debug for OnnxHandDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxHandDetector")
            .field("input_name", &self.input_name)
            .field("min_confidence", &self.min_confidence)
            .finish_non_exhaustive()
    }
}

impl OnnxHandDetector {
    pub fn new<P: AsRef<Path>>(model_path: P, min_confidence: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading hand landmark model from {}", model_path.display());

        let session = load_cpu_session(model_path, 2)?;
        let input_name = first_input_name(&session, "input_1");

        info!("✅ Hand landmark model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }

    fn to_tensor(image: &RgbImage) -> Array4<f32> {
        let side = image.width() as usize;
        let mut tensor = Array4::zeros((1, side, side, 3));
        for (x, y, pixel) in image.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
            }
        }
        tensor
    }
}

impl HandDetector for OnnxHandDetector {
    fn detect(&self, frame: &RgbImage) -> Result<Option<HandLandmarks>> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return Ok(None);
        }

        let input = Self::to_tensor(&letterbox(frame, LANDMARK_INPUT_SIZE));
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Hand landmark session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Hand landmark inference failed")?;

        let coords = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract landmark tensor")?;
        let score = outputs[1]
            .try_extract_array::<f32>()
            .context("Failed to extract presence tensor")?
            .iter()
            .next()
            .copied()
            .unwrap_or(0.0);

        if score < self.min_confidence {
            debug!("No hand (presence {:.3})", score);
            return Ok(None);
        }

        // Undo the letterbox: input pixels -> padded square -> original frame
        let long = w.max(h);
        let (pad_w, pad_h) = ((long - w) / 2, (long - h) / 2);
        let padded_w = (w + 2 * pad_w) as f32;
        let padded_h = (h + 2 * pad_h) as f32;
        let sx = padded_w / LANDMARK_INPUT_SIZE as f32;
        let sy = padded_h / LANDMARK_INPUT_SIZE as f32;

        let flat: Vec<f32> = coords.iter().copied().collect();
        let points = flat
            .chunks_exact(3)
            .map(|p| Landmark {
                x: (p[0] * sx - pad_w as f32) / w as f32,
                y: (p[1] * sy - pad_h as f32) / h as f32,
            })
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Ok(None);
        }

        Ok(Some(HandLandmarks { points, score }))
    }
}
