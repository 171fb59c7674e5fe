// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-session stabilizer windows
//!
//! Every caller gets its own window so concurrent clients never vote on
//! each other's frames.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{StableResult, Stabilizer, StabilizerConfig};

/// Session used when a request carries no session id
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub max_sessions: usize,
    pub session_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            session_ttl_secs: 600,     // 10 minutes
            cleanup_interval_secs: 60,
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    stabilizer: Stabilizer,
    last_seen: Instant,
}

impl SessionEntry {
    fn new(config: StabilizerConfig) -> Self {
        Self {
            stabilizer: Stabilizer::new(config),
            last_seen: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

/// Thread-safe map of session id to stabilizer window
#[derive(Clone)]
pub struct SessionWindowStore {
    stabilizer_config: StabilizerConfig,
    config: StoreConfig,
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SessionWindowStore {
    pub fn new(stabilizer_config: StabilizerConfig, config: StoreConfig) -> Self {
        Self {
            stabilizer_config,
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn stabilizer_config(&self) -> &StabilizerConfig {
        &self.stabilizer_config
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_secs)
    }

    /// Record an observation and vote, under a single lock
    ///
    /// Returns the vote result and the window length after the update.
    pub async fn observe_and_read(
        &self,
        session_id: &str,
        label: &str,
        confidence: f32,
    ) -> (StableResult, usize) {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(session_id) && sessions.len() >= self.config.max_sessions {
            Self::evict_oldest(&mut sessions);
        }

        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry::new(self.stabilizer_config));
        entry.touch();
        entry.stabilizer.observe(label, confidence);

        (entry.stabilizer.stable(), entry.stabilizer.len())
    }

    /// Clear the window of one session. Unknown sessions are a no-op.
    pub async fn reset(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.stabilizer.reset();
            entry.touch();
        }
    }

    /// Current vote for a session without recording anything
    pub async fn stable(&self, session_id: &str) -> StableResult {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|entry| entry.stabilizer.stable())
            .unwrap_or_else(StableResult::none)
    }

    pub async fn len(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|entry| entry.stabilizer.len())
            .unwrap_or(0)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn session_exists(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Drop sessions idle for longer than the configured TTL
    pub async fn cleanup_expired(&self) -> usize {
        let ttl = self.ttl();
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);

        initial_count - sessions.len()
    }

    /// Spawn a task that periodically expires idle sessions
    pub fn spawn_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let period = Duration::from_secs(self.config.cleanup_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = store.cleanup_expired().await;
                if removed > 0 {
                    debug!("Expired {} idle stabilizer sessions", removed);
                }
            }
        })
    }

    fn evict_oldest(sessions: &mut HashMap<String, SessionEntry>) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_seen)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            debug!("Session limit reached, evicting {}", id);
            sessions.remove(&id);
        }
    }
}
