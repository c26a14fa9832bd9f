//! Engine tuning
//!
//! Embedded as the `[engine]` table of the daemon config file. Every field
//! has a default so a partial table is fine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fuzzy::SimilarityMetric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recognition and synthesis locale
    pub locale: String,

    /// Minimum similarity for a fuzzy correction (inclusive)
    pub fuzzy_threshold: f64,

    pub similarity_metric: SimilarityMetric,

    /// Camera readiness poll interval
    pub camera_poll_interval_ms: u64,

    /// Poll attempts before a pending capture is abandoned
    pub camera_max_poll_attempts: u32,

    /// Display time for field/photo confirmations
    pub feedback_ttl_ms: u64,

    /// Display time for control command confirmations
    pub control_ttl_ms: u64,

    /// Marker prepended to utterances logged outside dictation mode
    pub notes_trace_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: "nb-NO".to_string(),
            fuzzy_threshold: 0.7,
            similarity_metric: SimilarityMetric::Levenshtein,
            camera_poll_interval_ms: 200,
            camera_max_poll_attempts: 50,
            feedback_ttl_ms: 4000,
            control_ttl_ms: 3000,
            notes_trace_prefix: "[tale] ".to_string(),
        }
    }
}

impl EngineConfig {
    /// Clamp out-of-range values loaded from disk
    pub fn validated(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) || self.fuzzy_threshold.is_nan() {
            let clamped = if self.fuzzy_threshold.is_nan() {
                0.7
            } else {
                self.fuzzy_threshold.clamp(0.0, 1.0)
            };
            warn!(
                "fuzzy_threshold {} out of range, using {}",
                self.fuzzy_threshold, clamped
            );
            self.fuzzy_threshold = clamped;
        }
        if self.camera_poll_interval_ms == 0 {
            warn!("camera_poll_interval_ms must be positive, using 200");
            self.camera_poll_interval_ms = 200;
        }
        if self.camera_max_poll_attempts == 0 {
            warn!("camera_max_poll_attempts must be positive, using 1");
            self.camera_max_poll_attempts = 1;
        }
        self
    }

    pub fn camera_poll_interval(&self) -> Duration {
        Duration::from_millis(self.camera_poll_interval_ms)
    }

    pub fn feedback_ttl(&self) -> Duration {
        Duration::from_millis(self.feedback_ttl_ms)
    }

    pub fn control_ttl(&self) -> Duration {
        Duration::from_millis(self.control_ttl_ms)
    }
}
