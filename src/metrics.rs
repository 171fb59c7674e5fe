// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prometheus metrics for the recognition service

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::pipeline::{FrameOutcome, INVALID_HAND_LABEL};

#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    frames_total: IntCounterVec,
    stable_predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    inference_seconds: Histogram,
    active_sessions: IntGauge,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let frames_total = IntCounterVec::new(
            Opts::new("sign_frames_total", "Frames processed, by outcome"),
            &["outcome"],
        )?;
        let stable_predictions_total = IntCounter::new(
            "sign_stable_predictions_total",
            "Frames that confirmed a stable prediction",
        )?;
        let prediction_errors_total = IntCounterVec::new(
            Opts::new("sign_prediction_errors_total", "Failed predict requests, by status"),
            &["status"],
        )?;
        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new("sign_inference_seconds", "End-to-end frame processing time")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        )?;
        let active_sessions =
            IntGauge::new("sign_active_sessions", "Sessions with a stabilizer window")?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(stable_predictions_total.clone()))?;
        registry.register(Box::new(prediction_errors_total.clone()))?;
        registry.register(Box::new(inference_seconds.clone()))?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            stable_predictions_total,
            prediction_errors_total,
            inference_seconds,
            active_sessions,
        })
    }

    pub fn record_outcome(&self, outcome: &FrameOutcome) {
        let label = if !outcome.hand_detected {
            "no_hand"
        } else if outcome.real_time_prediction.as_deref() == Some(INVALID_HAND_LABEL) {
            "invalid_region"
        } else {
            "classified"
        };
        self.frames_total.with_label_values(&[label]).inc();
        if outcome.should_add_to_transcript() {
            self.stable_predictions_total.inc();
        }
        self.inference_seconds.observe(outcome.inference_time_ms / 1000.0);
    }

    pub fn record_error(&self, status: u16) {
        let status = status.to_string();
        self.prediction_errors_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
