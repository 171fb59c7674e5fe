// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    classes_handler, health_handler, home_handler, metrics_handler, reset_buffer_handler,
};
use super::predict::predict_handler;
use crate::config::NodeConfig;
use crate::metrics::ServiceMetrics;
use crate::pipeline::FramePipeline;
use crate::stabilizer::SessionWindowStore;
use crate::vision::SignModelManager;

/// Shared state for every route
#[derive(Clone)]
pub struct AppState {
    pub models: Arc<SignModelManager>,
    pub store: SessionWindowStore,
    /// Present only when both the hand detector and the classifier loaded
    pub pipeline: Option<FramePipeline>,
    pub metrics: ServiceMetrics,
    pub config: Arc<NodeConfig>,
}

impl AppState {
    pub fn new(models: SignModelManager, config: NodeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let store = SessionWindowStore::new(config.stabilizer(), config.store());

        let pipeline = match (models.hand_detector(), models.classifier()) {
            (Some(detector), Some(classifier)) => Some(FramePipeline::new(
                detector,
                classifier,
                models.class_names(),
                store.clone(),
                config.pipeline(),
            )),
            _ => None,
        };

        Ok(Self {
            models: Arc::new(models),
            store,
            pipeline,
            metrics: ServiceMetrics::new()?,
            config: Arc::new(config),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/classes", get(classes_handler))
        .route("/reset_buffer", post(reset_buffer_handler))
        .route("/predict", post(predict_handler))
        .route("/metrics", get(metrics_handler))
        // Multipart framing adds a little on top of the raw image
        .layer(DefaultBodyLimit::max(max_upload + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let cleanup = state.store.spawn_cleanup_task();

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on {}", addr);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup.abort();
    result?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
