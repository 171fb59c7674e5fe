// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sign prediction endpoint module
//!
//! Provides POST /predict for classifying an uploaded camera frame.

pub mod handler;
pub mod response;

pub use handler::predict_handler;
pub use response::{BoundingBoxDto, PredictResponse};
