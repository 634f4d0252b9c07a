//! Process-wide classifier handle. If the artifact is missing or unusable the
//! service keeps running and callers get `ClassifyError::Unavailable`.

use super::bundle::{BundleShape, ModelBundle, Prediction};
use crate::error::{ClassifyError, LoadError};
use crate::features::FeatureVector;
use sha2::{Digest, Sha256};
use std::path::Path;

pub struct StressModel {
    bundle: Option<ModelBundle>,
    digest: Option<String>,
    load_error: Option<String>,
}

impl StressModel {
    /// Parse an artifact file into a bundle, returning it with its SHA-256 hex digest.
    pub fn try_load(path: &Path) -> Result<(ModelBundle, String), LoadError> {
        let bytes = std::fs::read(path)?;
        let digest = format!("{:x}", Sha256::digest(&bytes));
        let artifact: serde_json::Value = serde_json::from_slice(&bytes)?;
        let bundle = ModelBundle::from_value(artifact)?;
        Ok((bundle, digest))
    }

    /// Load model from path. Any failure leaves the model unavailable (fallback mode).
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok((bundle, digest)) => {
                tracing::info!(
                    path = %path.display(),
                    shape = bundle.shape().as_str(),
                    scaler = bundle.has_scaler(),
                    digest = %digest,
                    "stress model loaded"
                );
                Self {
                    bundle: Some(bundle),
                    digest: Some(digest),
                    load_error: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "stress model unavailable; serving fallback predictions");
                Self {
                    bundle: None,
                    digest: None,
                    load_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self {
            bundle: Some(bundle),
            digest: None,
            load_error: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            bundle: None,
            digest: None,
            load_error: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn has_scaler(&self) -> bool {
        self.bundle.as_ref().is_some_and(ModelBundle::has_scaler)
    }

    pub fn shape(&self) -> Option<BundleShape> {
        self.bundle.as_ref().map(ModelBundle::shape)
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<Prediction, ClassifyError> {
        match &self.bundle {
            Some(bundle) => bundle.classify(features),
            None => Err(ClassifyError::Unavailable),
        }
    }
}
