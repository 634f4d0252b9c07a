//! Stress Monitor: behavioral stress classification over HTTP.
//!
//! Modular structure:
//! - [`features`] Metric completion and fixed-order feature vectors
//! - [`model`] Classifier artifact loading, shape detection and inference
//! - [`session`] In-memory monitoring sessions
//! - [`storage`] Bounded, persisted analysis history
//! - [`service`] Classification orchestration with fallback results
//! - [`api`] axum router and JSON handlers
//! - [`logging`] Structured JSON logging

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod storage;
pub mod stress;

pub use config::ServiceConfig;
pub use features::FeatureVector;
pub use logging::StructuredLogger;
pub use model::{ModelBundle, StressModel};
pub use service::ClassificationService;
pub use session::SessionStore;
pub use storage::HistoryLog;
pub use stress::{ClassificationResult, StressLevel};
