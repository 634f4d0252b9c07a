//! Stress levels and the classification result returned to clients.

mod result;

pub use result::{ClassificationResult, Probabilities, FALLBACK_PROBABILITIES};

use serde::{Deserialize, Serialize};

/// Classes scored by the model, in `[bajo, medio, alto]` order.
pub const CLASS_COUNT: usize = 3;

pub const STRESS_LABELS: [&str; CLASS_COUNT] = ["BAJO", "MEDIO", "ALTO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StressLevel {
    Bajo,
    Medio,
    Alto,
}

impl StressLevel {
    pub const ALL: [StressLevel; CLASS_COUNT] =
        [StressLevel::Bajo, StressLevel::Medio, StressLevel::Alto];

    /// Level for a classifier label; `None` outside `0..=2`.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_label(label: &str) -> Option<Self> {
        STRESS_LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(|i| Self::ALL[i])
    }

    pub fn index(self) -> u8 {
        match self {
            StressLevel::Bajo => 0,
            StressLevel::Medio => 1,
            StressLevel::Alto => 2,
        }
    }

    pub fn label(self) -> &'static str {
        STRESS_LABELS[self.index() as usize]
    }

    /// Lowercase key used in probability and distribution maps.
    pub fn key(self) -> &'static str {
        match self {
            StressLevel::Bajo => "bajo",
            StressLevel::Medio => "medio",
            StressLevel::Alto => "alto",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_label_agree() {
        for (i, level) in StressLevel::ALL.iter().enumerate() {
            assert_eq!(level.index() as usize, i);
            assert_eq!(level.label(), STRESS_LABELS[i]);
            assert_eq!(StressLevel::from_index(i as i64), Some(*level));
        }
    }

    #[test]
    fn out_of_range_index_is_none() {
        assert_eq!(StressLevel::from_index(-1), None);
        assert_eq!(StressLevel::from_index(3), None);
    }

    #[test]
    fn label_parsing_ignores_case() {
        assert_eq!(StressLevel::from_label("alto"), Some(StressLevel::Alto));
        assert_eq!(StressLevel::from_label("Medio"), Some(StressLevel::Medio));
        assert_eq!(StressLevel::from_label("high"), None);
    }
}
