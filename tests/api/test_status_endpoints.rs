// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Status, classes, reset and metrics endpoint tests

use axum::http::StatusCode;
use sign_recognition_node::api::{create_router, AppState};
use sign_recognition_node::config::NodeConfig;
use sign_recognition_node::vision::SignModelManager;

use super::helpers::{app, get, json_body, post, send, state, text_body};
use crate::common::{ready_models, FixedHandDetector, ScriptedClassifier};

fn ready() -> SignModelManager {
    ready_models(
        FixedHandDetector::centered(),
        ScriptedClassifier::constant(vec![0.9, 0.05, 0.03, 0.02]),
    )
}

fn empty() -> SignModelManager {
    SignModelManager::from_parts(None, None, Vec::new(), 224)
}

#[tokio::test]
async fn test_home_reports_ready() {
    let response = send(app(ready()), get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["message"], "ASL/FSL Recognition API");
    assert_eq!(json["model"], "Loaded");
    assert_eq!(json["classes"], 4);
    assert_eq!(json["img_size"], "224x224");
    assert_eq!(json["status"], "Ready");
}

#[tokio::test]
async fn test_home_without_models() {
    let json = json_body(send(app(empty()), get("/")).await).await;
    assert_eq!(json["model"], "Not loaded");
    assert_eq!(json["model_input"], "N/A");
    assert_eq!(json["classes"], 0);
}

#[tokio::test]
async fn test_health_always_healthy() {
    let response = send(app(empty()), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], false);
    assert_eq!(json["classes_loaded"], false);
    assert_eq!(json["num_classes"], 0);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_classes_listed_in_file_order() {
    let response = send(app(ready()), get("/classes")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["total_classes"], 4);
    assert_eq!(json["classes"][0], "A");
    assert_eq!(json["classes"][3], "Hello");
}

#[tokio::test]
async fn test_classes_unavailable() {
    let response = send(app(empty()), get("/classes")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = json_body(response).await;
    assert_eq!(json["error_type"], "service_unavailable");
    assert_eq!(json["message"], "Classes not loaded");
}

#[tokio::test]
async fn test_reset_buffer_default_session() {
    let response = send(app(ready()), post("/reset_buffer", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "Buffer cleared");
    assert_eq!(json["session_id"], "default");
}

#[tokio::test]
async fn test_reset_buffer_clears_session_window() {
    let state = state(ready());
    for _ in 0..3 {
        state.store.observe_and_read("kiosk", "A", 0.9).await;
    }

    let response = send(create_router(state.clone()), post("/reset_buffer", Some("kiosk"))).await;
    let json = json_body(response).await;

    assert_eq!(json["session_id"], "kiosk");
    assert_eq!(state.store.len("kiosk").await, 0);
}

#[tokio::test]
async fn test_metrics_exposed() {
    let response = send(app(ready()), get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = text_body(response).await;
    assert!(body.contains("sign_active_sessions"));
}

#[tokio::test]
async fn test_unknown_route() {
    let response = send(app(ready()), get("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_state_rejects_invalid_thresholds() {
    let mut config = NodeConfig::default();
    config.thresholds.window_size = 0;
    assert!(AppState::new(ready(), config).is_err());

    let mut config = NodeConfig::default();
    config.thresholds.min_votes = 9;
    assert!(AppState::new(ready(), config).is_err());
}
