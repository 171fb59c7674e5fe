// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Temporal smoothing of per-frame sign predictions
//!
//! Each classified frame produces an [`Observation`]. A [`Stabilizer`] keeps
//! the most recent observations in a fixed-size window and confirms a label
//! once it holds a majority of the window with enough average confidence.
//!
//! Components:
//! - `Stabilizer` - Ring-buffer window with majority vote
//! - `store` - One window per client session

pub mod store;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{SessionWindowStore, StoreConfig, DEFAULT_SESSION};

/// Number of frames kept in the trailing window
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Minimum occurrences of a label before it can become stable
pub const DEFAULT_MIN_VOTES: usize = 3;

/// Minimum mean confidence of the winning label
pub const DEFAULT_STABLE_THRESHOLD: f32 = 0.70;

#[derive(Debug, Error, PartialEq)]
pub enum StabilizerError {
    #[error("window_size must be at least 1")]
    EmptyWindow,

    #[error("min_votes must be between 1 and window_size ({window_size}), got {min_votes}")]
    InvalidMinVotes { min_votes: usize, window_size: usize },

    #[error("stable_threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),
}

/// Tuning for the stabilizer vote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilizerConfig {
    pub window_size: usize,
    pub min_votes: usize,
    pub stable_threshold: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_votes: DEFAULT_MIN_VOTES,
            stable_threshold: DEFAULT_STABLE_THRESHOLD,
        }
    }
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<(), StabilizerError> {
        if self.window_size == 0 {
            return Err(StabilizerError::EmptyWindow);
        }
        if self.min_votes == 0 || self.min_votes > self.window_size {
            return Err(StabilizerError::InvalidMinVotes {
                min_votes: self.min_votes,
                window_size: self.window_size,
            });
        }
        if !(0.0..=1.0).contains(&self.stable_threshold) {
            return Err(StabilizerError::InvalidThreshold(self.stable_threshold));
        }
        Ok(())
    }
}

/// A single classified frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub label: String,
    pub confidence: f32,
}

impl Observation {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Outcome of a vote over the current window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StableResult {
    /// Confirmed label, if any
    pub label: Option<String>,
    /// Mean confidence of the confirmed label (0.0 when unconfirmed)
    pub confidence: f32,
}

impl StableResult {
    pub fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }

    pub fn is_stable(&self) -> bool {
        self.label.is_some()
    }
}

/// Debounces noisy frame predictions into a stable symbol stream
///
/// The window behaves like a ring buffer: once full, every new observation
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    config: StabilizerConfig,
    window: VecDeque<Observation>,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}

impl Stabilizer {
    /// Create a stabilizer. The config is assumed valid; see
    /// [`StabilizerConfig::validate`].
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window_size),
            config,
        }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.window_size
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Observations currently in the window, oldest first
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.window.iter()
    }

    /// Append an observation, evicting the oldest past capacity
    pub fn observe(&mut self, label: impl Into<String>, confidence: f32) {
        self.window.push_back(Observation::new(label, confidence));
        while self.window.len() > self.config.window_size {
            self.window.pop_front();
        }
    }

    /// Drop every observation
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Vote over the current window
    ///
    /// Ties between equally frequent labels go to the label seen first in
    /// the window.
    pub fn stable(&self) -> StableResult {
        if self.window.len() < self.config.min_votes {
            return StableResult::none();
        }

        // (label, count, confidence sum) in first-seen order
        let mut tally: Vec<(&str, usize, f32)> = Vec::with_capacity(self.window.len());
        for obs in &self.window {
            match tally.iter_mut().find(|(label, _, _)| *label == obs.label) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += obs.confidence;
                }
                None => tally.push((obs.label.as_str(), 1, obs.confidence)),
            }
        }

        let mut best: Option<(&str, usize, f32)> = None;
        for entry in tally {
            if best.map_or(true, |(_, count, _)| entry.1 > count) {
                best = Some(entry);
            }
        }

        let Some((label, count, sum)) = best else {
            return StableResult::none();
        };

        let mean = sum / count as f32;
        if count >= self.config.min_votes && mean >= self.config.stable_threshold {
            StableResult {
                label: Some(label.to_string()),
                confidence: mean,
            }
        } else {
            StableResult::none()
        }
    }
}
