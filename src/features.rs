//! Feature vector assembly for fraud scoring model inference.
//!
//! The classifier was trained on a 30-column dense matrix laid out as
//! `[scaled_amount, scaled_time, V1, V2, ..., V28]`. This module owns that
//! column contract: requests supply a sparse set of named components and the
//! builder produces the full-width vector with every unsupplied slot at 0.0.

use crate::scaler::AmountTimeScaler;
use crate::types::request::ScoreRequest;
use anyhow::{bail, Result};

/// Total width of the model input vector.
pub const FEATURE_WIDTH: usize = 30;

/// Slot holding the scaled transaction amount.
pub const SCALED_AMOUNT_SLOT: usize = 0;

/// Slot holding the scaled transaction time.
pub const SCALED_TIME_SLOT: usize = 1;

/// Component-to-slot mapping for the 28 anonymized components.
///
/// The slot assignment must match the column order the classifier and scaler
/// were fit against. Kept as a literal table so the contract stays auditable
/// against the training pipeline's column list.
pub const COMPONENT_SLOTS: [(&str, usize); 28] = [
    ("V1", 2),
    ("V2", 3),
    ("V3", 4),
    ("V4", 5),
    ("V5", 6),
    ("V6", 7),
    ("V7", 8),
    ("V8", 9),
    ("V9", 10),
    ("V10", 11),
    ("V11", 12),
    ("V12", 13),
    ("V13", 14),
    ("V14", 15),
    ("V15", 16),
    ("V16", 17),
    ("V17", 18),
    ("V18", 19),
    ("V19", 20),
    ("V20", 21),
    ("V21", 22),
    ("V22", 23),
    ("V23", 24),
    ("V24", 25),
    ("V25", 26),
    ("V26", 27),
    ("V27", 28),
    ("V28", 29),
];

/// Components exposed by the interactive input form. The remaining
/// components are implicitly zero for user-entered transactions.
pub const KEY_COMPONENTS: [&str; 5] = ["V4", "V11", "V12", "V14", "V17"];

/// Look up the vector slot for a named component.
pub fn component_slot(name: &str) -> Option<usize> {
    COMPONENT_SLOTS
        .iter()
        .find(|(component, _)| *component == name)
        .map(|(_, slot)| *slot)
}

/// Builds dense model input vectors from sparse score requests.
///
/// Holds the pre-fit amount/time scaler so that slots 0 and 1 always carry
/// scaled values consistent with training.
pub struct FeatureVectorBuilder {
    scaler: AmountTimeScaler,
}

impl FeatureVectorBuilder {
    /// Create a builder around a loaded scaler.
    pub fn new(scaler: AmountTimeScaler) -> Self {
        Self { scaler }
    }

    /// Assemble the full-width feature vector for a request.
    ///
    /// Every slot not covered by the request's component map is left at 0.0.
    /// An unknown component name cannot be mapped to a slot and is an error.
    pub fn build(&self, request: &ScoreRequest) -> Result<Vec<f32>> {
        let (scaled_amount, scaled_time) = self.scaler.transform(request.amount, request.time_seconds);

        let mut features = vec![0.0f32; FEATURE_WIDTH];
        features[SCALED_AMOUNT_SLOT] = scaled_amount as f32;
        features[SCALED_TIME_SLOT] = scaled_time as f32;

        for (name, value) in &request.components {
            match component_slot(name) {
                Some(slot) => features[slot] = *value as f32,
                None => bail!("unknown component '{}' has no vector slot", name),
            }
        }

        Ok(features)
    }

    /// Access the scaler backing this builder.
    pub fn scaler(&self) -> &AmountTimeScaler {
        &self.scaler
    }
}
