//! Result payload shared by the API, sessions and the history file.

use super::{StressLevel, CLASS_COUNT};
use crate::model::Prediction;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tied distribution reported whenever no real prediction is available.
pub const FALLBACK_PROBABILITIES: [f64; CLASS_COUNT] = [0.33, 0.34, 0.33];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub bajo: f64,
    pub medio: f64,
    pub alto: f64,
}

impl From<[f64; CLASS_COUNT]> for Probabilities {
    fn from(p: [f64; CLASS_COUNT]) -> Self {
        Self {
            bajo: p[0],
            medio: p[1],
            alto: p[2],
        }
    }
}

impl Probabilities {
    pub fn to_array(self) -> [f64; CLASS_COUNT] {
        [self.bajo, self.medio, self.alto]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub success: bool,
    pub stress_level: u8,
    pub stress_label: String,
    pub probabilities: Probabilities,
    /// RFC 3339; kept as text so history written by older builds still loads
    pub timestamp: String,
    #[serde(default)]
    pub features_used: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

impl ClassificationResult {
    fn with_level(level: StressLevel, probabilities: [f64; CLASS_COUNT], features_used: Map<String, Value>) -> Self {
        Self {
            success: true,
            stress_level: level.index(),
            stress_label: level.label().to_string(),
            probabilities: probabilities.into(),
            timestamp: now(),
            features_used,
            warning: None,
            error: None,
        }
    }

    /// A real model prediction.
    pub fn classified(prediction: Prediction, features_used: Map<String, Value>) -> Self {
        Self::with_level(prediction.level, prediction.probabilities, features_used)
    }

    /// Deterministic MEDIO answer used while no model is loaded.
    pub fn fallback(features_used: Map<String, Value>, warning: impl Into<String>) -> Self {
        let mut r = Self::with_level(StressLevel::Medio, FALLBACK_PROBABILITIES, features_used);
        r.warning = Some(warning.into());
        r
    }

    /// Classification was attempted and failed.
    pub fn failed(features_used: Map<String, Value>, error: impl Into<String>) -> Self {
        let mut r = Self::with_level(StressLevel::Medio, FALLBACK_PROBABILITIES, features_used);
        r.success = false;
        r.error = Some(error.into());
        r
    }

    pub fn level(&self) -> Option<StressLevel> {
        StressLevel::from_label(&self.stress_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_tied_medio() {
        let r = ClassificationResult::fallback(Map::new(), "no model");
        assert!(r.success);
        assert_eq!(r.stress_level, 1);
        assert_eq!(r.stress_label, "MEDIO");
        assert_eq!(r.probabilities.to_array(), FALLBACK_PROBABILITIES);
        assert_eq!(r.warning.as_deref(), Some("no model"));
        assert!(r.error.is_none());
    }

    #[test]
    fn failure_serializes_error_not_warning() {
        let r = ClassificationResult::failed(Map::new(), "boom");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "boom");
        assert_eq!(v["stress_label"], "MEDIO");
        assert!(v.get("warning").is_none());
    }

    #[test]
    fn legacy_entry_without_features_loads() {
        let r: ClassificationResult = serde_json::from_str(
            r#"{"success": true, "stress_level": 2, "stress_label": "ALTO",
                "probabilities": {"bajo": 0.1, "medio": 0.2, "alto": 0.7},
                "timestamp": "2025-05-01T10:00:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(r.level(), Some(StressLevel::Alto));
        assert!(r.features_used.is_empty());
    }
}
