//! End-to-end tests over a sample of the abalone dataset

use predictor_lib::artifact::{load_metadata, load_pipeline};
use predictor_lib::dataset::{read_csv, train_test_split};
use predictor_lib::predictor::{
    add_target, predict_csv, predict_frame, split_features_target, OutlierRule,
};
use predictor_lib::{
    evaluate, train_and_save, AbaloneInput, PredictorError, TrainingConfig, PREDICTION_COL,
    TARGET_COL,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/abalone_sample.csv")
}

fn config(dir: &TempDir) -> TrainingConfig {
    let mut config = TrainingConfig::new(fixture(), dir.path().join("models"), "v0.0.1");
    config.alpha = 0.5;
    config
}

#[test]
fn train_then_predict_csv() {
    let dir = TempDir::new().unwrap();
    let report = train_and_save(&config(&dir)).unwrap();
    assert!(report.metrics.rmse.is_finite());
    assert!(report.metrics.mae >= 0.0);

    let out = dir.path().join("scored/nested/predictions.csv");
    let summary = predict_csv(&report.pipeline_path, fixture(), Some(&out)).unwrap();
    assert_eq!(summary.n_rows, 31);
    assert_eq!(summary.pred_head.len(), 5);
    assert!(summary.pred_std >= 0.0);
    assert_eq!(summary.saved.as_deref(), Some(out.display().to_string().as_str()));

    let scored = read_csv(&out).unwrap();
    assert_eq!(scored.n_rows(), 31);
    assert_eq!(scored.column_names().last(), Some(&PREDICTION_COL));
}

#[test]
fn single_record_prediction_is_plausible() {
    let dir = TempDir::new().unwrap();
    let report = train_and_save(&config(&dir)).unwrap();
    let pipeline = load_pipeline(&report.pipeline_path).unwrap();

    let frame = AbaloneInput::example().to_frame().unwrap();
    let preds = predict_frame(&pipeline, &frame).unwrap();
    assert_eq!(preds.len(), 1);
    assert!(preds[0].is_finite() && preds[0] > 0.0);
}

#[test]
fn metadata_records_the_run() {
    let dir = TempDir::new().unwrap();
    let report = train_and_save(&config(&dir)).unwrap();
    let meta = load_metadata(&report.meta_path).unwrap();

    assert_eq!(meta.split.n_valid, 7);
    assert_eq!(meta.split.n_train, 24);
    assert_eq!(meta.split.random_state, 42);
    assert_eq!(meta.preprocessing.one_hot_drop, "first");
    assert_eq!(meta.preprocessing.handle_unknown, "ignore");
    assert_eq!(meta.artifacts.sha256.len(), 64);
    assert!(meta.meta.timestamp_utc.ends_with('Z'));
}

#[test]
fn outlier_rule_leaves_validation_untouched() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.outlier_rule = OutlierRule {
        column: "Height".to_string(),
        threshold: 0.1,
    };
    let report = train_and_save(&config).unwrap();
    let meta = load_metadata(&report.meta_path).unwrap();
    assert_eq!(meta.split.n_valid, 7);
    assert_eq!(meta.split.n_train, 24);
    assert!(meta.split.n_train_filtered < meta.split.n_train);

    // Re-split with the same seed and score the full validation partition
    let raw = read_csv(fixture()).unwrap();
    let with_target = add_target(&raw, config.target_offset).unwrap();
    let (features, targets) = split_features_target(&with_target, TARGET_COL).unwrap();
    let split =
        train_test_split(&features, &targets, config.test_size, config.random_state).unwrap();

    let heights = split
        .valid_features
        .column("Height")
        .unwrap()
        .data
        .to_f64_vec()
        .unwrap();
    let max_height = heights.iter().cloned().fold(f64::MIN, f64::max);
    assert!(config.outlier_rule.threshold < max_height);

    let pipeline = load_pipeline(&report.pipeline_path).unwrap();
    let preds = pipeline.predict(&split.valid_features).unwrap();
    let metrics = evaluate(&split.valid_targets, &preds).unwrap();
    assert_eq!(metrics, report.metrics);
}

#[test]
fn different_seeds_change_the_split() {
    let dir = TempDir::new().unwrap();
    let mut first = config(&dir);
    first.version = "a".to_string();
    let mut second = first.clone();
    second.version = "b".to_string();
    second.random_state = 7;

    let a = train_and_save(&first).unwrap();
    let b = train_and_save(&second).unwrap();
    assert_ne!(a.metrics, b.metrics);
}

#[test]
fn prediction_rejects_missing_feature() {
    let dir = TempDir::new().unwrap();
    let report = train_and_save(&config(&dir)).unwrap();
    let pipeline = load_pipeline(&report.pipeline_path).unwrap();

    let frame = AbaloneInput::example()
        .to_frame()
        .unwrap()
        .drop_columns(&["Shell weight"]);
    let result = predict_frame(&pipeline, &frame);
    assert!(matches!(result, Err(PredictorError::SchemaMismatch(_))));
}
