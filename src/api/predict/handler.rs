// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handler

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::session::{parse_session_id, session_from_headers};
use crate::pipeline::PipelineError;

/// Multipart field holding the frame
pub const FILE_FIELD: &str = "file";

/// Optional multipart field overriding the session header
pub const SESSION_FIELD: &str = "session_id";

/// POST /predict - Classify a frame and update the session's stable prediction
///
/// # Request
/// multipart/form-data with:
/// - `file`: Image bytes (PNG, JPEG, WebP, GIF, BMP) (required)
/// - `session_id`: Session key (optional, else `X-Session-Id`, else "default").
///   A blank or invalid value is ignored.
///
/// # Response
/// Real-time and stable predictions, bounding box, top-3 alternatives and
/// the size of the session window.
///
/// # Errors
/// - 400 Bad Request: Missing or empty file, undecodable image
/// - 503 Service Unavailable: Model, classes or hand detector not loaded
/// - 500 Internal Server Error: Inference failed
pub async fn predict_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    if !state.models.has_model() {
        return Err(unavailable(&state, "Model"));
    }
    if !state.models.has_classes() {
        return Err(unavailable(&state, "Classes"));
    }
    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or_else(|| unavailable(&state, "Hand detector"))?;

    let mut session_id = session_from_headers(&headers);
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Invalid multipart body: {}", e);
        ApiError::InvalidRequest(format!("Invalid multipart body: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read file: {}", e))
                })?;
                file = Some(bytes.to_vec());
            }
            SESSION_FIELD => {
                let text = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read session_id: {}", e))
                })?;
                // An unusable form value keeps the header session
                match parse_session_id(&text) {
                    Some(id) => session_id = id,
                    None => debug!("Ignoring invalid session_id field '{}'", text),
                }
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let file = file.ok_or_else(|| {
        state.metrics.record_error(400);
        ApiError::ValidationError {
            field: FILE_FIELD.to_string(),
            message: "file is required".to_string(),
        }
    })?;

    debug!("Predict request: session={}, {} bytes", session_id, file.len());

    match pipeline.process(&session_id, file).await {
        Ok(outcome) => {
            state.metrics.record_outcome(&outcome);
            if outcome.should_add_to_transcript() {
                info!(
                    "Stable prediction for {}: {:?} ({:.2})",
                    session_id, outcome.stable.label, outcome.stable.confidence
                );
            }
            Ok(Json(PredictResponse::from_outcome(outcome, session_id)))
        }
        Err(e) => {
            match e {
                PipelineError::Inference(_) | PipelineError::TaskFailed(_) => {
                    error!("Prediction failed for session {}: {}", session_id, e)
                }
                _ => warn!("Rejected frame for session {}: {}", session_id, e),
            }
            let api_error = ApiError::from(e);
            state.metrics.record_error(api_error.status_code());
            Err(api_error)
        }
    }
}

fn unavailable(state: &AppState, what: &'static str) -> ApiError {
    let error = PipelineError::ModelUnavailable(what);
    warn!("Rejecting predict request: {}", error);
    state.metrics.record_error(503);
    ApiError::from(error)
}
