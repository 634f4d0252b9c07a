//! Feature completion: raw client metrics → defaults filled → canonical vector.
//!
//! Values are not range-checked. Negative rates or absurd distances reach the
//! classifier unchanged and its behavior on them is unspecified.

use super::{FeatureVector, FEATURE_DEFAULTS, FEATURE_DIM, FEATURE_NAMES};
use serde_json::{Map, Number, Value};

/// Completed input: the vector fed to the model plus the mapping reported back
/// as `features_used` (canonical keys with effective values, extra keys verbatim).
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedFeatures {
    pub vector: FeatureVector,
    pub used: Map<String, Value>,
}

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Fill missing metrics from the default table and order them canonically.
pub fn complete(raw: &Map<String, Value>) -> FeatureVector {
    let mut values = [0.0; FEATURE_DIM];
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        values[i] = raw
            .get(*name)
            .and_then(coerce)
            .unwrap_or(FEATURE_DEFAULTS[i]);
    }
    FeatureVector::new(values)
}

/// Same as [`complete`], also producing the `features_used` mapping.
pub fn complete_features(raw: &Map<String, Value>) -> CompletedFeatures {
    let vector = complete(raw);
    let mut used = raw.clone();
    for (name, value) in FEATURE_NAMES.iter().zip(vector.values) {
        let provided_number = matches!(raw.get(*name), Some(Value::Number(_)));
        if provided_number {
            continue;
        }
        // NaN/inf have no JSON form; the vector still carries them.
        let number = Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null);
        used.insert((*name).to_string(), number);
    }
    CompletedFeatures { vector, used }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_input_is_all_defaults() {
        let fv = complete(&Map::new());
        assert_eq!(fv.values, FEATURE_DEFAULTS);
    }

    #[test]
    fn fills_only_missing_keys() {
        let raw = map(json!({"error_rate": 0.5, "keys_per_minute": 120}));
        let fv = complete(&raw);
        assert_eq!(fv.get("keys_per_minute"), Some(120.0));
        assert_eq!(fv.get("error_rate"), Some(0.5));
        assert_eq!(fv.get("avg_key_latency"), Some(150.0));
        assert_eq!(fv.get("avg_mouse_speed"), Some(350.0));
    }

    #[test]
    fn order_is_canonical_regardless_of_input_order() {
        let raw = map(json!({
            "avg_mouse_speed": 7, "total_mouse_distance": 6, "clicks_per_minute": 5,
            "error_rate": 4, "std_key_latency": 3, "avg_key_latency": 2, "keys_per_minute": 1
        }));
        assert_eq!(complete(&raw).values, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn out_of_domain_values_pass_through() {
        let raw = map(json!({"error_rate": -3.0, "keys_per_minute": 1e9}));
        let fv = complete(&raw);
        assert_eq!(fv.get("error_rate"), Some(-3.0));
        assert_eq!(fv.get("keys_per_minute"), Some(1e9));
    }

    #[test]
    fn numeric_strings_coerce_and_junk_defaults() {
        let raw = map(json!({"keys_per_minute": " 85 ", "error_rate": "lots", "clicks_per_minute": null}));
        let fv = complete(&raw);
        assert_eq!(fv.get("keys_per_minute"), Some(85.0));
        assert_eq!(fv.get("error_rate"), Some(0.02));
        assert_eq!(fv.get("clicks_per_minute"), Some(12.0));
    }

    #[test]
    fn features_used_keeps_provided_and_extra_keys() {
        let raw = map(json!({"keys_per_minute": 60, "note": "extra"}));
        let completed = complete_features(&raw);
        assert_eq!(completed.used.get("keys_per_minute"), Some(&json!(60)));
        assert_eq!(completed.used.get("note"), Some(&json!("extra")));
        assert_eq!(completed.used.get("avg_key_latency"), Some(&json!(150.0)));
        assert_eq!(completed.used.len(), FEATURE_DIM + 1);
    }
}
