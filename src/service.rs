//! Orchestration: complete features → classify → record. Never fails outward;
//! every failure mode maps to a fallback result.

use crate::config::ServiceConfig;
use crate::features::{complete_features, FEATURE_NAMES};
use crate::model::{BundleShape, StressModel};
use crate::session::SessionStore;
use crate::storage::{Distribution, HistoryLog};
use crate::stress::ClassificationResult;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Built-in high-stress sample used by the self-test endpoint (canonical order).
pub const SAMPLE_FEATURES: [f64; 7] = [85.0, 85.0, 35.0, 0.08, 25.0, 2800.0, 650.0];

pub const FALLBACK_WARNING: &str = "model not available; returning default prediction";

pub fn sample_features() -> Map<String, Value> {
    FEATURE_NAMES
        .iter()
        .zip(SAMPLE_FEATURES)
        .map(|(name, v)| ((*name).to_string(), Value::from(v)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_analyses: usize,
    pub distribution: Distribution,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub model_shape: Option<BundleShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    pub active_sessions: usize,
}

pub struct ClassificationService {
    model: Arc<StressModel>,
    sessions: Arc<SessionStore>,
    history: HistoryLog,
}

impl ClassificationService {
    pub fn new(model: Arc<StressModel>, sessions: Arc<SessionStore>, history: HistoryLog) -> Self {
        Self {
            model,
            sessions,
            history,
        }
    }

    /// Load the model artifact and open the history file named in `config`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(StressModel::load(&config.model_path)),
            Arc::new(SessionStore::new()),
            HistoryLog::new(&config.history.path, config.history.capacity),
        )
    }

    pub fn model(&self) -> &StressModel {
        &self.model
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Complete and classify raw metrics without touching sessions or history.
    pub fn evaluate(&self, raw: &Map<String, Value>) -> ClassificationResult {
        let completed = complete_features(raw);
        if !self.model.is_available() {
            return ClassificationResult::fallback(completed.used, FALLBACK_WARNING);
        }
        match self.model.classify(&completed.vector) {
            Ok(prediction) => ClassificationResult::classified(prediction, completed.used),
            Err(e) => {
                tracing::warn!(error = %e, "classification failed; returning default");
                ClassificationResult::failed(completed.used, e.to_string())
            }
        }
    }

    /// Classify raw client metrics. Records into the named session (if it exists)
    /// and, for real predictions, into history.
    pub fn analyze(&self, raw: &Map<String, Value>, session_id: Option<&str>) -> ClassificationResult {
        let result = self.evaluate(raw);

        self.sessions.append_analysis(session_id, &result);
        if result.success && result.warning.is_none() {
            self.history.append(&result);
        }
        tracing::info!(
            session_id = session_id.unwrap_or(""),
            level = %result.stress_label,
            success = result.success,
            "analysis complete"
        );
        result
    }

    /// Run the built-in high-stress sample. Nothing is recorded.
    pub fn analyze_sample(&self) -> ClassificationResult {
        self.evaluate(&sample_features())
    }

    pub fn stats(&self) -> Stats {
        let history = self.history.load();
        Stats {
            total_analyses: history.len(),
            distribution: Distribution::from_results(&history),
            model_loaded: self.model.is_available(),
        }
    }

    pub fn status(&self) -> Status {
        Status {
            model_loaded: self.model.is_available(),
            scaler_loaded: self.model.has_scaler(),
            model_shape: self.model.shape(),
            model_digest: self.model.digest().map(str::to_string),
            model_error: self.model.load_error().map(str::to_string),
            active_sessions: self.sessions.len(),
        }
    }
}
