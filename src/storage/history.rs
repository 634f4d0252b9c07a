//! Bounded history of classification results in a single JSON file.
//!
//! Every append loads the whole file, pushes, trims to capacity and rewrites the
//! file. There is no locking: concurrent appends race and the last writer wins.
//! Entries that do not parse as results are skipped on read and dropped on the
//! next rewrite.

use crate::error::PersistenceError;
use crate::stress::{ClassificationResult, StressLevel};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Count of stored results per stress label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub bajo: usize,
    pub medio: usize,
    pub alto: usize,
}

impl Distribution {
    /// Entries whose label is not one of the three levels are skipped.
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut d = Self::default();
        for level in results.iter().filter_map(ClassificationResult::level) {
            match level {
                StressLevel::Bajo => d.bajo += 1,
                StressLevel::Medio => d.medio += 1,
                StressLevel::Alto => d.alto += 1,
            }
        }
        d
    }
}

pub struct HistoryLog {
    path: PathBuf,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn try_load(&self) -> Result<Vec<ClassificationResult>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(&self.path)?;
        let raw: Vec<serde_json::Value> = serde_json::from_slice(&data)?;
        let total = raw.len();
        let entries: Vec<ClassificationResult> = raw
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if entries.len() < total {
            tracing::warn!(
                path = %self.path.display(),
                skipped = total - entries.len(),
                "history entries not readable as results; skipped"
            );
        }
        Ok(entries)
    }

    fn save(&self, entries: &[ClassificationResult]) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    /// Whole history, oldest first. Unreadable or corrupt storage reads as empty.
    pub fn load(&self) -> Vec<ClassificationResult> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "history unreadable; treating as empty");
            Vec::new()
        })
    }

    /// Append one result, keeping only the most recent `capacity` entries.
    /// Write failures are logged and dropped.
    pub fn append(&self, result: &ClassificationResult) {
        let mut entries = self.load();
        entries.push(result.clone());
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        if let Err(e) = self.save(&entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "history write failed");
        }
    }

    /// Up to `limit` most recent results, oldest first (most recent last).
    pub fn read_recent(&self, limit: usize) -> Vec<ClassificationResult> {
        let mut entries = self.load();
        let start = entries.len().saturating_sub(limit);
        entries.split_off(start)
    }

    pub fn total(&self) -> usize {
        self.load().len()
    }

    pub fn distribution(&self) -> Distribution {
        Distribution::from_results(&self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn result(n: usize) -> ClassificationResult {
        let mut features = Map::new();
        features.insert("seq".to_string(), json!(n));
        ClassificationResult::fallback(features, "test")
    }

    fn seq(r: &ClassificationResult) -> u64 {
        r.features_used["seq"].as_u64().unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"), 100);
        assert!(log.load().is_empty());
        assert_eq!(log.total(), 0);
    }

    #[test]
    fn corrupt_file_is_empty_and_recovers_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();
        let log = HistoryLog::new(&path, 100);
        assert!(log.load().is_empty());
        log.append(&result(1));
        assert_eq!(log.total(), 1);
    }

    #[test]
    fn foreign_entries_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let good = serde_json::to_value(vec![result(0), result(1)]).unwrap();
        let mut items = good.as_array().cloned().unwrap();
        items.push(json!({"success": false, "error": "x"}));
        items.push(json!(42));
        std::fs::write(&path, serde_json::to_vec(&items).unwrap()).unwrap();

        let log = HistoryLog::new(&path, 100);
        assert_eq!(log.total(), 2);
        log.append(&result(2));
        let seqs: Vec<u64> = log.load().iter().map(seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn read_recent_is_most_recent_last() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"), 100);
        for n in 0..5 {
            log.append(&result(n));
        }
        let recent: Vec<u64> = log.read_recent(3).iter().map(seq).collect();
        assert_eq!(recent, vec![2, 3, 4]);
        assert_eq!(log.read_recent(50).len(), 5);
        assert!(log.read_recent(0).is_empty());
    }

    #[test]
    fn creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nested/data/history.json"), 10);
        log.append(&result(0));
        assert_eq!(log.total(), 1);
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let log = HistoryLog::new(dir.path(), 10);
        log.append(&result(0));
        assert!(log.load().is_empty());
    }

    #[test]
    fn distribution_counts_labels() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"), 10);
        log.append(&result(0));
        log.append(&result(1));
        let d = log.distribution();
        assert_eq!(d, Distribution { bajo: 0, medio: 2, alto: 0 });
    }
}
