// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Session window store tests

use sign_recognition_node::stabilizer::{SessionWindowStore, StabilizerConfig, StoreConfig};

fn store() -> SessionWindowStore {
    SessionWindowStore::new(StabilizerConfig::default(), StoreConfig::default())
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let store = store();
    for _ in 0..3 {
        store.observe_and_read("left", "A", 0.9).await;
    }
    let (right, right_len) = store.observe_and_read("right", "B", 0.9).await;

    assert_eq!(store.stable("left").await.label.as_deref(), Some("A"));
    assert!(!right.is_stable());
    assert_eq!(right_len, 1);
    assert_eq!(store.session_count().await, 2);
}

#[tokio::test]
async fn test_observe_reports_window_length() {
    let store = store();
    let mut last = 0;
    for _ in 0..7 {
        last = store.observe_and_read("cam", "A", 0.9).await.1;
    }
    assert_eq!(last, 5);
    assert_eq!(store.len("cam").await, 5);
}

#[tokio::test]
async fn test_reset_only_touches_one_session() {
    let store = store();
    for _ in 0..3 {
        store.observe_and_read("a", "A", 0.9).await;
        store.observe_and_read("b", "B", 0.9).await;
    }

    store.reset("a").await;

    assert_eq!(store.len("a").await, 0);
    assert_eq!(store.len("b").await, 3);
    assert!(store.session_exists("a").await);
}

#[tokio::test]
async fn test_reset_unknown_session_is_noop() {
    let store = store();
    store.reset("ghost").await;
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn test_max_sessions_evicts_least_recent() {
    let store = SessionWindowStore::new(
        StabilizerConfig::default(),
        StoreConfig {
            max_sessions: 2,
            ..Default::default()
        },
    );

    store.observe_and_read("first", "A", 0.9).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.observe_and_read("second", "A", 0.9).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.observe_and_read("third", "A", 0.9).await;

    assert_eq!(store.session_count().await, 2);
    assert!(!store.session_exists("first").await);
    assert!(store.session_exists("third").await);
}

#[tokio::test]
async fn test_cleanup_expires_idle_sessions() {
    let store = SessionWindowStore::new(
        StabilizerConfig::default(),
        StoreConfig {
            session_ttl_secs: 0,
            ..Default::default()
        },
    );
    store.observe_and_read("idle", "A", 0.9).await;

    let removed = store.cleanup_expired().await;
    assert_eq!(removed, 1);
    assert_eq!(store.session_count().await, 0);
}
