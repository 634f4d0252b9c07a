//! Classifier bundle shapes and load-time shape detection.
//!
//! Training exports came in three conventions over time. They are told apart
//! once, at load, in a fixed order:
//!
//! 1. a mapping with both `model` and `scaler` entries → [`ModelBundle::Paired`]
//! 2. a mapping with a `pipeline` entry, or a composite estimator itself
//!    (`"type": "pipeline"` or a `steps` entry) → [`ModelBundle::PipelineOnly`]
//! 3. anything else is parsed as a bare estimator → [`ModelBundle::Direct`]

use super::estimator::Estimator;
use super::pipeline::Pipeline;
use super::transform::Transformer;
use crate::error::{ClassifyError, LoadError};
use crate::features::{FeatureVector, FEATURE_DIM, FEATURE_NAMES};
use crate::stress::{StressLevel, CLASS_COUNT};
use ndarray::Array1;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleShape {
    Paired,
    PipelineOnly,
    Direct,
}

impl BundleShape {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleShape::Paired => "paired",
            BundleShape::PipelineOnly => "pipeline_only",
            BundleShape::Direct => "direct",
        }
    }
}

/// Decide which export convention an artifact follows.
pub fn detect_shape(artifact: &Value) -> BundleShape {
    let Some(map) = artifact.as_object() else {
        return BundleShape::Direct;
    };
    if map.contains_key("model") && map.contains_key("scaler") {
        return BundleShape::Paired;
    }
    let composite = map.get("type").and_then(Value::as_str) == Some("pipeline")
        || map.contains_key("steps");
    if map.contains_key("pipeline") || composite {
        return BundleShape::PipelineOnly;
    }
    BundleShape::Direct
}

#[derive(Debug, Clone)]
pub enum ModelBundle {
    /// Separate scaler applied before the estimator
    Paired { model: Estimator, scaler: Transformer },
    /// Scaling, if any, lives inside the pipeline
    PipelineOnly(Pipeline),
    /// Estimator consumes raw features
    Direct(Estimator),
}

/// Model output after class-order checks and label clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub level: StressLevel,
    pub probabilities: [f64; CLASS_COUNT],
}

fn malformed(e: serde_json::Error) -> LoadError {
    LoadError::Malformed(e.to_string())
}

impl ModelBundle {
    pub fn from_value(artifact: Value) -> Result<Self, LoadError> {
        let shape = detect_shape(&artifact);
        let bundle = match (shape, artifact) {
            (BundleShape::Paired, Value::Object(mut map)) => {
                let model = map.remove("model").unwrap_or(Value::Null);
                let scaler = map.remove("scaler").unwrap_or(Value::Null);
                ModelBundle::Paired {
                    model: serde_json::from_value(model).map_err(malformed)?,
                    scaler: serde_json::from_value(scaler).map_err(malformed)?,
                }
            }
            (BundleShape::PipelineOnly, Value::Object(mut map)) => {
                let pipeline = match map.remove("pipeline") {
                    Some(inner) => inner,
                    None => Value::Object(map),
                };
                ModelBundle::PipelineOnly(serde_json::from_value(pipeline).map_err(malformed)?)
            }
            (_, other) => ModelBundle::Direct(serde_json::from_value(other).map_err(malformed)?),
        };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn shape(&self) -> BundleShape {
        match self {
            ModelBundle::Paired { .. } => BundleShape::Paired,
            ModelBundle::PipelineOnly(_) => BundleShape::PipelineOnly,
            ModelBundle::Direct(_) => BundleShape::Direct,
        }
    }

    /// Whether a scaling step runs before the estimator.
    pub fn has_scaler(&self) -> bool {
        match self {
            ModelBundle::Paired { .. } => true,
            ModelBundle::PipelineOnly(p) => !p.transforms().is_empty(),
            ModelBundle::Direct(_) => false,
        }
    }

    fn estimator(&self) -> &Estimator {
        match self {
            ModelBundle::Paired { model, .. } => model,
            ModelBundle::PipelineOnly(p) => p.estimator(),
            ModelBundle::Direct(m) => m,
        }
    }

    fn transforms(&self) -> Vec<&Transformer> {
        match self {
            ModelBundle::Paired { scaler, .. } => vec![scaler],
            ModelBundle::PipelineOnly(p) => p.transforms().iter().collect(),
            ModelBundle::Direct(_) => Vec::new(),
        }
    }

    /// Reject bundles whose widths or class counts cannot serve the 7-metric, 3-class contract.
    fn validate(&self) -> Result<(), LoadError> {
        for t in self.transforms() {
            if t.n_features() != FEATURE_DIM {
                return Err(LoadError::Malformed(format!(
                    "scaler expects {} features, service provides {}",
                    t.n_features(),
                    FEATURE_DIM
                )));
            }
        }
        let estimator = self.estimator();
        let width = estimator.n_features();
        let width_ok = match estimator {
            Estimator::LogisticRegression(_) => width == FEATURE_DIM,
            _ => width <= FEATURE_DIM,
        };
        if !width_ok {
            return Err(LoadError::Malformed(format!(
                "estimator reads {} features, service provides {}",
                width, FEATURE_DIM
            )));
        }
        if estimator.n_classes() != CLASS_COUNT {
            return Err(LoadError::Malformed(format!(
                "estimator scores {} classes, expected {}",
                estimator.n_classes(),
                CLASS_COUNT
            )));
        }
        Ok(())
    }

    /// Score a completed feature vector into a stress level and `[bajo, medio, alto]` probabilities.
    /// Non-finite inputs are rejected before any estimator sees them.
    pub fn classify(&self, features: &FeatureVector) -> Result<Prediction, ClassifyError> {
        if let Some(i) = features.values.iter().position(|v| !v.is_finite()) {
            return Err(ClassifyError::NonFiniteFeature(FEATURE_NAMES[i]));
        }
        let x = Array1::from(features.values.to_vec());
        let (proba, classes) = match self {
            ModelBundle::Paired { model, scaler } => {
                let scaled = scaler.transform(&x)?;
                (model.predict_proba(&scaled)?, model.classes())
            }
            ModelBundle::PipelineOnly(p) => (p.predict_proba(&x)?, p.classes()),
            ModelBundle::Direct(m) => (m.predict_proba(&x)?, m.classes()),
        };
        finalize(proba, classes)
    }
}

fn finalize(proba: Vec<f64>, classes: &[i64]) -> Result<Prediction, ClassifyError> {
    if proba.len() != CLASS_COUNT {
        return Err(ClassifyError::ClassCount(proba.len()));
    }
    if classes.len() != proba.len() {
        return Err(ClassifyError::Malformed(format!(
            "{} class labels for {} probabilities",
            classes.len(),
            proba.len()
        )));
    }
    if proba.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(ClassifyError::NonFinite);
    }
    let total: f64 = proba.iter().sum();
    if total <= 0.0 {
        return Err(ClassifyError::NonFinite);
    }

    let mut probabilities = [0.0; CLASS_COUNT];
    for (slot, p) in probabilities.iter_mut().zip(&proba) {
        *slot = p / total;
    }

    // First maximum wins ties.
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate() {
        if *p > probabilities[best] {
            best = i;
        }
    }
    let raw_label = classes[best];
    let level = StressLevel::from_index(raw_label).unwrap_or_else(|| {
        tracing::warn!(label = raw_label, "classifier label out of range; clamped to MEDIO");
        StressLevel::Medio
    });

    Ok(Prediction {
        level,
        probabilities,
    })
}
