//! Trained stress classifier: artifact loading, shape detection and native inference.

mod adapter;
mod bundle;
mod estimator;
mod pipeline;
mod transform;

pub use adapter::StressModel;
pub use bundle::{detect_shape, BundleShape, ModelBundle, Prediction};
pub use estimator::{DecisionTree, Estimator, LogisticRegression, RandomForest, DEFAULT_CLASSES};
pub use pipeline::Pipeline;
pub use transform::{MinMaxScaler, StandardScaler, Transformer};
