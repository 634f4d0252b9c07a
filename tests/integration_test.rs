//! Integration test: config load, model shapes from disk, fallback mode, sessions, history cap.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stress_monitor::{
    config::ServiceConfig,
    features::FEATURE_NAMES,
    model::{BundleShape, StressModel},
    service::{sample_features, ClassificationService, FALLBACK_WARNING},
    session::SessionStore,
    storage::HistoryLog,
    stress::FALLBACK_PROBABILITIES,
    FeatureVector, StressLevel,
};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/stress_model.json")
}

fn service(model: StressModel, dir: &tempfile::TempDir) -> ClassificationService {
    ClassificationService::new(
        Arc::new(model),
        Arc::new(SessionStore::new()),
        HistoryLog::new(dir.path().join("stress_data.json"), 100),
    )
}

fn write_artifact(dir: &tempfile::TempDir, name: &str, artifact: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_vec(artifact).unwrap()).unwrap();
    path
}

fn fixture_parts() -> (Value, Value) {
    let v: Value = serde_json::from_slice(&std::fs::read(fixture()).unwrap()).unwrap();
    (v["model"].clone(), v["scaler"].clone())
}

#[test]
fn config_load_default() {
    let c = ServiceConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.history.capacity, 100);
    assert_eq!(c.server.port, 5000);
    assert_eq!(c.model_path, PathBuf::from("stress_detection_model.json"));
}

#[test]
fn fixture_loads_as_paired() {
    let model = StressModel::load(&fixture());
    assert!(model.is_available());
    assert!(model.has_scaler());
    assert_eq!(model.shape(), Some(BundleShape::Paired));
    assert_eq!(model.digest().map(str::len), Some(64));
}

#[test]
fn sample_regression_fixture_is_alto() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(StressModel::load(&fixture()), &dir);
    let first = svc.analyze_sample();
    assert!(first.success);
    assert_eq!(first.stress_label, "ALTO");
    assert_eq!(first.stress_level, 2);
    for _ in 0..3 {
        let again = svc.analyze_sample();
        assert_eq!(again.stress_label, first.stress_label);
        assert_eq!(again.probabilities, first.probabilities);
    }
}

#[test]
fn default_features_score_bajo() {
    let model = StressModel::load(&fixture());
    let p = model.classify(&FeatureVector::defaults()).unwrap();
    assert_eq!(p.level, StressLevel::Bajo);
}

#[test]
fn probabilities_sum_to_one_across_inputs() {
    let model = StressModel::load(&fixture());
    let grid = [0.0, 1.0, 45.0, 500.0, -20.0, 1e6];
    for a in grid {
        for b in grid {
            let mut values = stress_monitor::features::FEATURE_DEFAULTS;
            values[0] = a;
            values[5] = b;
            let p = model.classify(&FeatureVector::new(values)).unwrap();
            assert_eq!(p.probabilities.len(), 3);
            assert!((p.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn three_shapes_from_disk_agree() {
    let dir = tempfile::tempdir().unwrap();
    let (model, scaler) = fixture_parts();
    let pipeline = write_artifact(
        &dir,
        "pipeline.json",
        &json!({"pipeline": {"steps": [["scaler", scaler.clone()], ["clf", model.clone()]]}}),
    );
    let composite = write_artifact(
        &dir,
        "composite.json",
        &json!({"type": "pipeline", "steps": [scaler, model]}),
    );

    let paired = StressModel::load(&fixture());
    let pipeline = StressModel::load(&pipeline);
    let composite = StressModel::load(&composite);
    assert_eq!(pipeline.shape(), Some(BundleShape::PipelineOnly));
    assert_eq!(composite.shape(), Some(BundleShape::PipelineOnly));

    let sample = stress_monitor::features::complete(&sample_features());
    let expected = paired.classify(&sample).unwrap();
    for m in [&pipeline, &composite] {
        let p = m.classify(&sample).unwrap();
        assert_eq!(p.level, expected.level);
        for (a, b) in p.probabilities.iter().zip(expected.probabilities) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn direct_forest_artifact() {
    let dir = tempfile::tempdir().unwrap();
    // keys_per_minute <= 70 → BAJO-leaning leaf, else ALTO-leaning leaf
    let tree = json!({
        "type": "decision_tree",
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [0, -2, -2],
        "threshold": [70.0, -2.0, -2.0],
        "value": [[10.0, 10.0, 10.0], [8.0, 2.0, 0.0], [0.0, 3.0, 7.0]]
    });
    let path = write_artifact(
        &dir,
        "forest.json",
        &json!({"type": "random_forest", "estimators": [tree.clone(), tree]}),
    );
    let svc = service(StressModel::load(&path), &dir);
    assert_eq!(svc.model().shape(), Some(BundleShape::Direct));
    assert!(!svc.model().has_scaler());
    assert_eq!(svc.analyze_sample().stress_label, "ALTO");
    assert_eq!(svc.analyze(&Map::new(), None).stress_label, "BAJO");
}

#[test]
fn broken_artifact_serves_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(&dir, "bad.json", &json!({"model": {"type": "svm"}, "scaler": {}}));
    let svc = service(StressModel::load(&path), &dir);
    assert!(!svc.model().is_available());

    for features in [Map::new(), sample_features()] {
        let r = svc.analyze(&features, None);
        assert!(r.success);
        assert_eq!(r.stress_label, "MEDIO");
        assert_eq!(r.stress_level, 1);
        assert_eq!(r.probabilities.to_array(), FALLBACK_PROBABILITIES);
        assert_eq!(r.warning.as_deref(), Some(FALLBACK_WARNING));
    }
    assert!(svc.status().model_error.is_some());
}

#[test]
fn history_keeps_last_hundred_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(StressModel::load(&fixture()), &dir);
    for n in 0..150 {
        let mut features = Map::new();
        features.insert("seq".to_string(), json!(n));
        let r = svc.analyze(&features, None);
        assert!(r.success);
        assert!(svc.history().total() <= 100);
    }

    let stored = svc.history().load();
    assert_eq!(stored.len(), 100);
    let seqs: Vec<u64> = stored
        .iter()
        .map(|r| r.features_used["seq"].as_u64().unwrap())
        .collect();
    assert_eq!(seqs, (50..150).collect::<Vec<u64>>());

    // survives a restart
    let reopened = HistoryLog::new(dir.path().join("stress_data.json"), 100);
    assert_eq!(reopened.total(), 100);
    assert_eq!(reopened.read_recent(1)[0].features_used["seq"], json!(149));
}

#[test]
fn features_used_reports_completed_set() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(StressModel::load(&fixture()), &dir);
    let mut features = Map::new();
    features.insert("error_rate".to_string(), json!(0.1));
    let r = svc.analyze(&features, None);
    for name in FEATURE_NAMES {
        assert!(r.features_used.contains_key(name), "missing {}", name);
    }
    assert_eq!(r.features_used["error_rate"], json!(0.1));
    assert_eq!(r.features_used["keys_per_minute"], json!(45.0));
}

#[test]
fn session_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let svc = service(StressModel::load(&fixture()), &dir);
    let sessions = svc.sessions();

    let id = sessions.start(Some("student-1".to_string()));
    assert_eq!(
        sessions.record_events(&id, vec![json!({"type": "keydown", "t": 1})]).unwrap(),
        (1, 1)
    );
    svc.analyze(&sample_features(), Some(id.as_str()));
    let session = sessions.get(&id).unwrap();
    assert_eq!(session.events.len(), 1);
    assert_eq!(session.analyses.len(), 1);
    assert_eq!(session.analyses[0].stress_label, "ALTO");

    assert!(sessions.record_events("nope", vec![json!(1)]).is_err());
    assert_eq!(sessions.len(), 1);

    sessions.start(Some("student-1".to_string()));
    let reset = sessions.get(&id).unwrap();
    assert!(reset.events.is_empty() && reset.analyses.is_empty());
}
