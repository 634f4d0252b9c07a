//! Native evaluators for the exported classifier families.

use crate::error::ClassifyError;
use ndarray::{Array1, Array2};
use serde::Deserialize;

/// Class labels assumed when the export omits them.
pub const DEFAULT_CLASSES: [i64; 3] = [0, 1, 2];

fn default_classes() -> Vec<i64> {
    DEFAULT_CLASSES.to_vec()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    #[serde(alias = "decision_tree_classifier")]
    DecisionTree(DecisionTree),
    #[serde(alias = "random_forest_classifier")]
    RandomForest(RandomForest),
}

impl Estimator {
    /// Per-class probabilities, in the order of [`Estimator::classes`].
    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Vec<f64>, ClassifyError> {
        match self {
            Estimator::LogisticRegression(m) => m.predict_proba(x),
            Estimator::DecisionTree(m) => m.predict_proba(x),
            Estimator::RandomForest(m) => m.predict_proba(x),
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            Estimator::LogisticRegression(m) => &m.classes,
            Estimator::DecisionTree(m) => &m.classes,
            Estimator::RandomForest(m) => &m.classes,
        }
    }

    /// Widest feature index the estimator reads, plus one.
    pub fn n_features(&self) -> usize {
        match self {
            Estimator::LogisticRegression(m) => m.coef.ncols(),
            Estimator::DecisionTree(m) => m.n_features(),
            Estimator::RandomForest(m) => m.n_features(),
        }
    }

    pub fn n_classes(&self) -> usize {
        match self {
            Estimator::LogisticRegression(m) => m.coef.nrows(),
            Estimator::DecisionTree(m) => m.n_classes,
            Estimator::RandomForest(m) => m.n_classes,
        }
    }
}

/// Multinomial logistic regression: `softmax(coef · x + intercept)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawLogisticRegression")]
pub struct LogisticRegression {
    coef: Array2<f64>,
    intercept: Array1<f64>,
    classes: Vec<i64>,
}

#[derive(Deserialize)]
struct RawLogisticRegression {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default = "default_classes")]
    classes: Vec<i64>,
}

impl TryFrom<RawLogisticRegression> for LogisticRegression {
    type Error = String;

    fn try_from(raw: RawLogisticRegression) -> Result<Self, Self::Error> {
        let rows = raw.coef.len();
        let cols = raw.coef.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err("logistic_regression coef is empty".to_string());
        }
        if raw.coef.iter().any(|r| r.len() != cols) {
            return Err("logistic_regression coef rows differ in length".to_string());
        }
        if raw.intercept.len() != rows || raw.classes.len() != rows {
            return Err(format!(
                "logistic_regression has {} coef rows, {} intercepts, {} classes",
                rows,
                raw.intercept.len(),
                raw.classes.len()
            ));
        }
        let flat: Vec<f64> = raw.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((rows, cols), flat).map_err(|e| e.to_string())?;
        Ok(Self {
            coef,
            intercept: Array1::from(raw.intercept),
            classes: raw.classes,
        })
    }
}

impl LogisticRegression {
    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Vec<f64>, ClassifyError> {
        if x.len() != self.coef.ncols() {
            return Err(ClassifyError::DimensionMismatch {
                expected: self.coef.ncols(),
                actual: x.len(),
            });
        }
        let scores = self.coef.dot(x) + &self.intercept;
        let max = scores.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let exp = scores.mapv(|s| (s - max).exp());
        let total = exp.sum();
        Ok(exp.iter().map(|e| e / total).collect())
    }
}

/// Flat-array binary tree as exported from a fitted decision tree.
/// `x[feature] <= threshold` descends left; `children_left == -1` marks a leaf.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawDecisionTree")]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
    classes: Vec<i64>,
    n_classes: usize,
}

#[derive(Deserialize)]
struct RawDecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
    #[serde(default = "default_classes")]
    classes: Vec<i64>,
}

impl TryFrom<RawDecisionTree> for DecisionTree {
    type Error = String;

    fn try_from(raw: RawDecisionTree) -> Result<Self, Self::Error> {
        let n = raw.children_left.len();
        if n == 0 {
            return Err("decision_tree has no nodes".to_string());
        }
        if [
            raw.children_right.len(),
            raw.feature.len(),
            raw.threshold.len(),
            raw.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("decision_tree node arrays differ in length".to_string());
        }
        let n_classes = raw.classes.len();
        if raw.value.iter().any(|v| v.len() != n_classes) {
            return Err(format!(
                "decision_tree value rows must have {} entries",
                n_classes
            ));
        }
        for node in 0..n {
            let (left, right) = (raw.children_left[node], raw.children_right[node]);
            if left == -1 && right == -1 {
                continue;
            }
            // Children always follow their parent in depth-first export order,
            // which also rules out cycles.
            let valid = |c: i64| c > node as i64 && (c as usize) < n;
            if !valid(left) || !valid(right) || raw.feature[node] < 0 {
                return Err(format!("decision_tree node {} is malformed", node));
            }
        }
        Ok(Self {
            children_left: raw.children_left,
            children_right: raw.children_right,
            feature: raw.feature,
            threshold: raw.threshold,
            value: raw.value,
            classes: raw.classes,
            n_classes,
        })
    }
}

impl DecisionTree {
    fn n_features(&self) -> usize {
        self.children_left
            .iter()
            .zip(&self.feature)
            .filter(|(left, _)| **left != -1)
            .map(|(_, f)| *f as usize + 1)
            .max()
            .unwrap_or(0)
    }

    fn leaf(&self, x: &Array1<f64>) -> Result<usize, ClassifyError> {
        let mut node = 0usize;
        while self.children_left[node] != -1 {
            let f = self.feature[node] as usize;
            let v = *x.get(f).ok_or(ClassifyError::DimensionMismatch {
                expected: f + 1,
                actual: x.len(),
            })?;
            node = if v <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(node)
    }

    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Vec<f64>, ClassifyError> {
        let counts = &self.value[self.leaf(x)?];
        let total: f64 = counts.iter().sum();
        if !(total > 0.0) {
            return Err(ClassifyError::Malformed("decision tree leaf has no samples".to_string()));
        }
        Ok(counts.iter().map(|c| c / total).collect())
    }
}

/// Mean of member tree probabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawRandomForest")]
pub struct RandomForest {
    estimators: Vec<DecisionTree>,
    classes: Vec<i64>,
    n_classes: usize,
}

#[derive(Deserialize)]
struct RawRandomForest {
    estimators: Vec<DecisionTree>,
    #[serde(default = "default_classes")]
    classes: Vec<i64>,
}

impl TryFrom<RawRandomForest> for RandomForest {
    type Error = String;

    fn try_from(raw: RawRandomForest) -> Result<Self, Self::Error> {
        if raw.estimators.is_empty() {
            return Err("random_forest has no estimators".to_string());
        }
        let n_classes = raw.classes.len();
        if raw.estimators.iter().any(|t| t.n_classes != n_classes) {
            return Err(format!(
                "random_forest trees must all score {} classes",
                n_classes
            ));
        }
        Ok(Self {
            estimators: raw.estimators,
            classes: raw.classes,
            n_classes,
        })
    }
}

impl RandomForest {
    fn n_features(&self) -> usize {
        self.estimators
            .iter()
            .map(DecisionTree::n_features)
            .max()
            .unwrap_or(0)
    }

    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Vec<f64>, ClassifyError> {
        let mut acc = Array1::<f64>::zeros(self.n_classes);
        for tree in &self.estimators {
            acc += &Array1::from(tree.predict_proba(x)?);
        }
        acc /= self.estimators.len() as f64;
        Ok(acc.to_vec())
    }
}
