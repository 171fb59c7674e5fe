// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Status, class list, buffer reset and metrics handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::errors::ApiError;
use super::http_server::AppState;
use super::session::session_from_headers;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub version: String,
    pub model: String,
    pub classes: usize,
    pub img_size: String,
    pub model_input: String,
    pub hand_detector: bool,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub classes_loaded: bool,
    pub num_classes: usize,
    pub img_size: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResponse {
    pub total_classes: usize,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub status: String,
    pub session_id: String,
}

/// GET / - Service and model status summary
pub async fn home_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let models = &state.models;
    let img_size = models.img_size();
    let ready = models.has_model() && models.has_classes() && models.has_hand_detector();

    Json(StatusResponse {
        message: "ASL/FSL Recognition API".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        model: if models.has_model() { "Loaded" } else { "Not loaded" }.to_string(),
        classes: models.class_names().len(),
        img_size: format!("{}x{}", img_size, img_size),
        model_input: models.model_input_description(),
        hand_detector: models.has_hand_detector(),
        status: if ready { "Ready" } else { "Degraded" }.to_string(),
    })
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = &state.models;
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: models.has_model(),
        classes_loaded: models.has_classes(),
        num_classes: models.class_names().len(),
        img_size: models.img_size(),
        timestamp: chrono::Local::now().to_rfc3339(),
    })
}

/// GET /classes - 503 while the class list is not loaded
pub async fn classes_handler(
    State(state): State<AppState>,
) -> Result<Json<ClassesResponse>, ApiError> {
    let classes = state.models.class_names();
    if classes.is_empty() {
        return Err(ApiError::ServiceUnavailable("Classes not loaded".to_string()));
    }

    Ok(Json(ClassesResponse {
        total_classes: classes.len(),
        classes: classes.as_ref().clone(),
    }))
}

/// POST /reset_buffer - Clear the caller's stabilizer window
pub async fn reset_buffer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ResetResponse> {
    let session_id = session_from_headers(&headers);
    state.store.reset(&session_id).await;
    debug!("Buffer cleared for session {}", session_id);

    Json(ResetResponse {
        status: "Buffer cleared".to_string(),
        session_id,
    })
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    state
        .metrics
        .set_active_sessions(state.store.session_count().await);

    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
