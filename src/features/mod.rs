//! Interaction metrics → fixed-order feature vector for the stress classifier.

mod normalizer;

pub use normalizer::{complete, complete_features, CompletedFeatures};

use serde::{Deserialize, Serialize};

/// Number of metrics the classifier was trained on
pub const FEATURE_DIM: usize = 7;

/// Canonical metric order. Must match the column order used at training time.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "keys_per_minute",
    "avg_key_latency",
    "std_key_latency",
    "error_rate",
    "clicks_per_minute",
    "total_mouse_distance",
    "avg_mouse_speed",
];

/// Substituted for any metric the client did not send (same order as [`FEATURE_NAMES`])
pub const FEATURE_DEFAULTS: [f64; FEATURE_DIM] = [45.0, 150.0, 25.0, 0.02, 12.0, 1200.0, 350.0];

/// Fixed-size feature vector for model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_DIM],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_DIM]) -> Self {
        Self { values }
    }

    pub fn defaults() -> Self {
        Self::new(FEATURE_DEFAULTS)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Value of a metric by name, `None` for unknown names
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::defaults()
    }
}
