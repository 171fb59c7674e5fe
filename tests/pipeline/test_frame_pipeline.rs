// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end frame pipeline tests with in-memory models

use std::sync::Arc;

use sign_recognition_node::pipeline::{
    FramePipeline, PipelineConfig, PipelineError, INVALID_HAND_LABEL, UNCERTAIN_LABEL,
};
use sign_recognition_node::stabilizer::{SessionWindowStore, StabilizerConfig, StoreConfig};
use sign_recognition_node::vision::{HandDetector, HandLandmarks, Landmark, SignClassifier};

use crate::common::{
    class_names, confident, png_frame, FailingClassifier, FixedHandDetector, ScriptedClassifier,
};

fn pipeline(
    detector: impl HandDetector + 'static,
    classifier: Arc<dyn SignClassifier>,
) -> (FramePipeline, SessionWindowStore) {
    let store = SessionWindowStore::new(StabilizerConfig::default(), StoreConfig::default());
    let pipeline = FramePipeline::new(
        Arc::new(detector),
        classifier,
        Arc::new(class_names()),
        store.clone(),
        PipelineConfig::default(),
    );
    (pipeline, store)
}

#[tokio::test]
async fn test_stable_after_three_agreeing_frames() {
    let classifier = Arc::new(ScriptedClassifier::constant(confident(3, 0.9)));
    let (pipeline, _) = pipeline(FixedHandDetector::centered(), classifier.clone());

    let first = pipeline.process("cam", png_frame(120, 90)).await.unwrap();
    let second = pipeline.process("cam", png_frame(120, 90)).await.unwrap();
    assert!(!first.should_add_to_transcript());
    assert!(!second.should_add_to_transcript());

    let third = pipeline.process("cam", png_frame(120, 90)).await.unwrap();
    assert!(third.hand_detected);
    assert_eq!(third.real_time_prediction.as_deref(), Some("Hello"));
    assert_eq!(third.stable.label.as_deref(), Some("Hello"));
    assert!(third.should_add_to_transcript());
    assert_eq!(third.buffer_size, 3);
    assert_eq!(third.top_k.len(), 3);
    assert!(third.bounding_box.is_some());
    assert_eq!(classifier.call_count(), 3);
}

#[tokio::test]
async fn test_low_confidence_is_uncertain_but_still_recorded() {
    let classifier = Arc::new(ScriptedClassifier::constant(confident(0, 0.5)));
    let (pipeline, store) = pipeline(FixedHandDetector::centered(), classifier);

    let outcome = pipeline.process("cam", png_frame(64, 64)).await.unwrap();

    assert_eq!(outcome.real_time_prediction.as_deref(), Some(UNCERTAIN_LABEL));
    assert!((outcome.real_time_confidence - 0.5).abs() < 1e-6);
    // The raw label enters the window even when reported as uncertain
    assert_eq!(outcome.buffer_size, 1);
    assert_eq!(store.len("cam").await, 1);
}

#[tokio::test]
async fn test_no_hand_clears_window() {
    let classifier: Arc<dyn SignClassifier> =
        Arc::new(ScriptedClassifier::constant(confident(1, 0.9)));
    let (with_hand, store) = pipeline(FixedHandDetector::centered(), classifier.clone());
    for _ in 0..3 {
        with_hand.process("cam", png_frame(80, 80)).await.unwrap();
    }
    assert_eq!(store.len("cam").await, 3);

    let without_hand = FramePipeline::new(
        Arc::new(FixedHandDetector::absent()),
        classifier,
        Arc::new(class_names()),
        store.clone(),
        PipelineConfig::default(),
    );
    let outcome = without_hand.process("cam", png_frame(80, 80)).await.unwrap();

    assert!(!outcome.hand_detected);
    assert!(outcome.real_time_prediction.is_none());
    assert!(outcome.bounding_box.is_none());
    assert!(outcome.top_k.is_empty());
    assert_eq!(outcome.buffer_size, 0);
    assert_eq!(store.len("cam").await, 0);
}

#[tokio::test]
async fn test_empty_hand_region_reports_invalid_hand() {
    let detector = FixedHandDetector {
        hand: Some(HandLandmarks {
            points: vec![Landmark { x: 5.0, y: 5.0 }],
            score: 0.9,
        }),
    };
    let classifier = Arc::new(ScriptedClassifier::constant(confident(0, 0.9)));
    let (pipeline, _) = pipeline(detector, classifier.clone());

    let outcome = pipeline.process("cam", png_frame(40, 40)).await.unwrap();

    assert!(outcome.hand_detected);
    assert_eq!(outcome.real_time_prediction.as_deref(), Some(INVALID_HAND_LABEL));
    assert_eq!(outcome.buffer_size, 0);
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_sessions_do_not_share_votes() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        confident(0, 0.9),
        confident(1, 0.9),
        confident(0, 0.9),
        confident(1, 0.9),
        confident(0, 0.9),
    ]));
    let (pipeline, _) = pipeline(FixedHandDetector::centered(), classifier);

    let mut last_a = None;
    let mut last_b = None;
    for i in 0..5 {
        let session = if i % 2 == 0 { "a" } else { "b" };
        let outcome = pipeline.process(session, png_frame(64, 64)).await.unwrap();
        if i % 2 == 0 {
            last_a = Some(outcome);
        } else {
            last_b = Some(outcome);
        }
    }

    let a = last_a.unwrap();
    let b = last_b.unwrap();
    assert_eq!(a.stable.label.as_deref(), Some("A"));
    assert_eq!(a.buffer_size, 3);
    assert!(!b.should_add_to_transcript());
    assert_eq!(b.buffer_size, 2);
}

#[tokio::test]
async fn test_errors() {
    let classifier = Arc::new(ScriptedClassifier::constant(confident(0, 0.9)));
    let (pipeline, _) = pipeline(FixedHandDetector::centered(), classifier);

    assert!(matches!(
        pipeline.process("cam", Vec::new()).await,
        Err(PipelineError::EmptyUpload)
    ));
    assert!(matches!(
        pipeline.process("cam", b"GIF89a-but-not-really".to_vec()).await,
        Err(PipelineError::InvalidImage(_))
    ));

    let (failing, store) =
        self::pipeline(FixedHandDetector::centered(), Arc::new(FailingClassifier));
    assert!(matches!(
        failing.process("cam", png_frame(64, 64)).await,
        Err(PipelineError::Inference(_))
    ));
    assert_eq!(store.len("cam").await, 0);
}

#[tokio::test]
async fn test_inference_time_reported() {
    let classifier = Arc::new(ScriptedClassifier::constant(confident(2, 0.8)));
    let (pipeline, _) = pipeline(FixedHandDetector::centered(), classifier);

    let outcome = pipeline.process("cam", png_frame(64, 64)).await.unwrap();
    assert!(outcome.inference_time_ms >= 0.0);
}
