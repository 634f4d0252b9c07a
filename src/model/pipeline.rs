//! Composite estimator: zero or more transformers followed by one estimator.

use super::estimator::Estimator;
use super::transform::Transformer;
use crate::error::ClassifyError;
use ndarray::Array1;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawPipeline")]
pub struct Pipeline {
    transforms: Vec<Transformer>,
    estimator: Estimator,
}

#[derive(Deserialize)]
struct RawPipeline {
    steps: Vec<StepEntry>,
}

/// Steps come either as `[name, step]` pairs or as bare step objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum StepEntry {
    Named(String, Step),
    Bare(Step),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Step {
    Transform(Transformer),
    Estimate(Estimator),
}

impl StepEntry {
    fn into_parts(self) -> (String, Step) {
        match self {
            StepEntry::Named(name, step) => (name, step),
            StepEntry::Bare(step) => (String::new(), step),
        }
    }
}

impl TryFrom<RawPipeline> for Pipeline {
    type Error = String;

    fn try_from(raw: RawPipeline) -> Result<Self, Self::Error> {
        let mut steps = raw.steps.into_iter().map(StepEntry::into_parts).collect::<Vec<_>>();
        let estimator = match steps.pop() {
            Some((_, Step::Estimate(e))) => e,
            Some((name, Step::Transform(_))) => {
                return Err(format!("pipeline ends with transformer step '{}'", name))
            }
            None => return Err("pipeline has no steps".to_string()),
        };
        let transforms = steps
            .into_iter()
            .map(|(name, step)| match step {
                Step::Transform(t) => Ok(t),
                Step::Estimate(_) => Err(format!("pipeline has estimator '{}' before the last step", name)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            transforms,
            estimator,
        })
    }
}

impl Pipeline {
    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Vec<f64>, ClassifyError> {
        let mut current = x.clone();
        for t in &self.transforms {
            current = t.transform(&current)?;
        }
        self.estimator.predict_proba(&current)
    }

    pub fn classes(&self) -> &[i64] {
        self.estimator.classes()
    }

    pub fn transforms(&self) -> &[Transformer] {
        &self.transforms
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}
