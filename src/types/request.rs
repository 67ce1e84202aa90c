//! Score request data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single transaction submitted for fraud scoring.
///
/// Only the amount, the time offset, and a sparse set of anonymized
/// components are supplied; every component not present in the map is
/// treated as 0.0 when the feature vector is assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Unique request identifier.
    pub request_id: String,

    /// Raw transaction amount, unscaled.
    #[serde(alias = "Amount")]
    pub amount: f64,

    /// Seconds elapsed since the start of the observation window, unscaled.
    #[serde(alias = "Time")]
    pub time_seconds: f64,

    /// Sparse anonymized components by name ("V1".."V28").
    #[serde(default)]
    pub components: HashMap<String, f64>,

    /// Submission timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ScoreRequest {
    /// Create a request with no components supplied.
    pub fn new(request_id: impl Into<String>, amount: f64, time_seconds: f64) -> Self {
        Self {
            request_id: request_id.into(),
            amount,
            time_seconds,
            components: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set a named component value.
    pub fn with_component(mut self, name: impl Into<String>, value: f64) -> Self {
        self.components.insert(name.into(), value);
        self
    }
}
