// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for sign recognition
//!
//! This module provides:
//! - Frame decoding from uploaded bytes
//! - Hand localisation and ROI cropping
//! - ROI preprocessing and sign classification
//!
//! All models run on CPU through ONNX Runtime.

pub mod classifier;
pub mod hand;
pub mod image_utils;
pub mod model_manager;
pub mod onnx;
pub mod preprocessing;

pub use classifier::{
    rank_predictions, Classification, OnnxSignClassifier, RankedLabel, SignClassifier,
};
pub use hand::{
    crop_roi, hand_bounding_box, BoundingBox, HandDetector, HandLandmarks, Landmark,
    OnnxHandDetector,
};
pub use image_utils::{decode_frame, decode_frame_with_limit, detect_format, FrameInfo, ImageError};
pub use model_manager::{load_class_names, SignModelConfig, SignModelManager};
