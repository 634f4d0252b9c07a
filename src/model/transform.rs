//! Feature scalers exported alongside (or inside) the trained classifier.

use crate::error::ClassifyError;
use ndarray::Array1;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transformer {
    StandardScaler(StandardScaler),
    #[serde(alias = "minmax_scaler")]
    MinMaxScaler(MinMaxScaler),
}

impl Transformer {
    pub fn transform(&self, x: &Array1<f64>) -> Result<Array1<f64>, ClassifyError> {
        let width = self.n_features();
        if x.len() != width {
            return Err(ClassifyError::DimensionMismatch {
                expected: width,
                actual: x.len(),
            });
        }
        Ok(match self {
            Transformer::StandardScaler(s) => (x - &s.mean) / &s.scale,
            Transformer::MinMaxScaler(s) => x * &s.scale + &s.min,
        })
    }

    pub fn n_features(&self) -> usize {
        match self {
            Transformer::StandardScaler(s) => s.mean.len(),
            Transformer::MinMaxScaler(s) => s.min.len(),
        }
    }
}

/// `(x - mean) / scale`. Missing `mean` or `scale` means the scaler was fitted
/// with centering or scaling turned off.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawStandardScaler")]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

#[derive(Deserialize)]
struct RawStandardScaler {
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

impl TryFrom<RawStandardScaler> for StandardScaler {
    type Error = String;

    fn try_from(raw: RawStandardScaler) -> Result<Self, Self::Error> {
        let width = match (&raw.mean, &raw.scale) {
            (Some(m), Some(s)) if m.len() != s.len() => {
                return Err(format!(
                    "standard_scaler mean has {} entries, scale has {}",
                    m.len(),
                    s.len()
                ))
            }
            (Some(m), _) => m.len(),
            (None, Some(s)) => s.len(),
            (None, None) => return Err("standard_scaler needs mean or scale".to_string()),
        };
        let mean = raw.mean.map(Array1::from).unwrap_or_else(|| Array1::zeros(width));
        // Zero variance columns were left unscaled at fit time.
        let scale = raw
            .scale
            .map(Array1::from)
            .unwrap_or_else(|| Array1::ones(width))
            .mapv(|s| if s == 0.0 { 1.0 } else { s });
        Ok(Self { mean, scale })
    }
}

/// `x * scale + min`
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawMinMaxScaler")]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
}

#[derive(Deserialize)]
struct RawMinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<RawMinMaxScaler> for MinMaxScaler {
    type Error = String;

    fn try_from(raw: RawMinMaxScaler) -> Result<Self, Self::Error> {
        if raw.min.len() != raw.scale.len() {
            return Err(format!(
                "min_max_scaler min has {} entries, scale has {}",
                raw.min.len(),
                raw.scale.len()
            ));
        }
        Ok(Self {
            min: Array1::from(raw.min),
            scale: Array1::from(raw.scale),
        })
    }
}
