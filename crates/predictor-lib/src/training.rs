//! End-to-end training run: load, prepare, fit, evaluate, persist

use crate::artifact::{
    ArtifactInfo, ArtifactStore, EnvironmentInfo, ModelInfo, PreprocessingInfo, SplitInfo,
    TrainingMetadata,
};
use crate::dataset::{read_csv, train_test_split};
use crate::error::{PredictorError, Result};
use crate::evaluation::{evaluate, RegressionMetrics};
use crate::models::TARGET_COL;
use crate::predictor::{
    add_target, build_model_pipeline, build_preprocessor, filter_training_outliers,
    infer_column_roles, split_features_target, OutlierRule, DEFAULT_TARGET_OFFSET,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parameters of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub out_dir: PathBuf,
    pub version: String,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_target_offset")]
    pub target_offset: f64,
    #[serde(default)]
    pub outlier_rule: OutlierRule,
}

fn default_test_size() -> f64 {
    0.2
}

fn default_random_state() -> u64 {
    42
}

fn default_alpha() -> f64 {
    1.0
}

fn default_target_offset() -> f64 {
    DEFAULT_TARGET_OFFSET
}

impl TrainingConfig {
    pub fn new(
        data_path: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            data_path: data_path.into(),
            out_dir: out_dir.into(),
            version: version.into(),
            test_size: default_test_size(),
            random_state: default_random_state(),
            alpha: default_alpha(),
            target_offset: default_target_offset(),
            outlier_rule: OutlierRule::default(),
        }
    }
}

/// Where a training run wrote its artifacts, and how well it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub pipeline_path: PathBuf,
    pub meta_path: PathBuf,
    #[serde(flatten)]
    pub metrics: RegressionMetrics,
}

/// Train a pipeline on `config.data_path` and persist it with its metadata
///
/// Nothing is written unless loading, fitting and evaluation all succeed.
pub fn train_and_save(config: &TrainingConfig) -> Result<TrainingReport> {
    let started = Instant::now();
    let raw = read_csv(&config.data_path)?;
    let with_target = add_target(&raw, config.target_offset)?;
    let (features, targets) = split_features_target(&with_target, TARGET_COL)?;

    if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
        return Err(PredictorError::InvalidInput(format!(
            "row {} has no `{}` value",
            row, TARGET_COL
        )));
    }

    let split = train_test_split(&features, &targets, config.test_size, config.random_state)?;
    let n_train = split.train_features.n_rows();
    let n_valid = split.valid_features.n_rows();

    let (train_x, train_y) =
        filter_training_outliers(&split.train_features, &split.train_targets, &config.outlier_rule)?;
    if train_x.n_rows() == 0 {
        return Err(PredictorError::InvalidInput(format!(
            "outlier rule `{}` removed every training row",
            config.outlier_rule.describe()
        )));
    }

    let roles = infer_column_roles(&train_x);
    debug!(
        categorical = ?roles.categorical,
        numerical = ?roles.numerical,
        "Inferred column roles"
    );

    let preprocessor = build_preprocessor(roles.categorical.clone(), roles.numerical.clone());
    let mut pipeline = build_model_pipeline(preprocessor, config.alpha)?;
    pipeline.fit(&train_x, &train_y)?;

    let valid_pred = pipeline.predict(&split.valid_features)?;
    let metrics = evaluate(&split.valid_targets, &valid_pred)?;

    let store = ArtifactStore::new(&config.out_dir);
    let saved = store.save_pipeline(&pipeline, &config.version)?;

    let metadata = TrainingMetadata {
        version: config.version.clone(),
        data_path: config.data_path.display().to_string(),
        artifacts: ArtifactInfo {
            pipeline: saved.path.display().to_string(),
            sha256: saved.sha256,
        },
        metrics_valid: metrics,
        split: SplitInfo {
            test_size: config.test_size,
            random_state: config.random_state,
            n_train,
            n_train_filtered: train_x.n_rows(),
            n_valid,
        },
        model: ModelInfo {
            model_type: "Ridge".to_string(),
            alpha: config.alpha,
        },
        preprocessing: PreprocessingInfo {
            one_hot_drop: "first".to_string(),
            handle_unknown: "ignore".to_string(),
            scaler: "StandardScaler".to_string(),
            categorical_cols: roles.categorical,
            numerical_cols: roles.numerical,
            outlier_rule: config.outlier_rule.describe(),
        },
        meta: EnvironmentInfo::current(),
    };
    let meta_path = match store.save_metadata(&metadata) {
        Ok(path) => path,
        Err(e) => {
            // A pipeline without its metadata is never left behind
            if let Err(cleanup) = fs::remove_file(&saved.path) {
                warn!(
                    path = %saved.path.display(),
                    error = %cleanup,
                    "Failed to remove pipeline after metadata write failed"
                );
            }
            return Err(e);
        }
    };

    info!(
        event = "training_completed",
        version = %config.version,
        n_train = n_train,
        n_train_filtered = metadata.split.n_train_filtered,
        n_valid = n_valid,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        duration_ms = started.elapsed().as_millis() as u64,
        "Training completed"
    );

    Ok(TrainingReport {
        pipeline_path: saved.path,
        meta_path,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{load_metadata, load_pipeline};
    use crate::dataset::read_csv;
    use crate::predictor::strip_leakage_columns;
    use tempfile::TempDir;

    const TEN_ROWS: &str = "\
Sex,Length,Diameter,Height,Whole weight,Shucked weight,Viscera weight,Shell weight,Rings
M,0.455,0.365,0.095,0.514,0.2245,0.101,0.15,15
M,0.35,0.265,0.09,0.2255,0.0995,0.0485,0.07,7
F,0.53,0.42,0.135,0.677,0.2565,0.1415,0.21,9
M,0.44,0.365,0.125,0.516,0.2155,0.114,0.155,10
I,0.33,0.255,0.08,0.205,0.0895,0.0395,0.055,7
I,0.425,0.3,0.095,0.3515,0.141,0.0775,0.12,8
F,0.53,0.415,0.15,0.7775,0.237,0.1415,0.33,20
F,0.545,0.425,0.125,0.768,0.294,0.1495,0.26,16
M,0.475,0.37,0.125,0.5095,0.2165,0.1125,0.165,9
F,0.55,0.44,0.15,0.8945,0.3145,0.151,0.32,19
";

    fn setup(data: &str) -> (TempDir, TrainingConfig) {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("abalone.csv");
        fs::write(&data_path, data).unwrap();
        let mut config = TrainingConfig::new(&data_path, dir.path().join("models"), "v0.0.1");
        config.alpha = 0.5;
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::new("d.csv", "out", "v1");
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.target_offset, 1.5);
        assert_eq!(config.outlier_rule, OutlierRule::default());
    }

    #[test]
    fn test_ten_row_run_writes_artifacts() {
        let (_dir, config) = setup(TEN_ROWS);
        let report = train_and_save(&config).unwrap();

        assert!(report.pipeline_path.exists());
        assert!(report.meta_path.exists());
        assert!(report.metrics.rmse.is_finite() && report.metrics.rmse >= 0.0);

        let meta = load_metadata(&report.meta_path).unwrap();
        assert_eq!(meta.version, "v0.0.1");
        assert!(PathBuf::from(&meta.artifacts.pipeline).exists());
        assert_eq!(meta.split.n_valid, 2);
        assert_eq!(meta.split.n_train, 8);
        assert_eq!(meta.model.model_type, "Ridge");
        assert_eq!(meta.model.alpha, 0.5);
        assert_eq!(meta.preprocessing.categorical_cols, vec!["Sex"]);
        assert_eq!(meta.preprocessing.numerical_cols.len(), 7);
        assert_eq!(meta.metrics_valid, report.metrics);
    }

    #[test]
    fn test_same_config_gives_same_metrics() {
        let (_dir, config) = setup(TEN_ROWS);
        let first = train_and_save(&config).unwrap();
        let second = train_and_save(&config).unwrap();
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn test_reloaded_pipeline_matches_metrics_source() {
        let (_dir, config) = setup(TEN_ROWS);
        let report = train_and_save(&config).unwrap();

        let pipeline = load_pipeline(&report.pipeline_path).unwrap();
        let raw = read_csv(&config.data_path).unwrap();
        let preds = pipeline.predict(&strip_leakage_columns(&raw)).unwrap();
        assert_eq!(preds.len(), 10);
        assert!(preds.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_missing_target_writes_nothing() {
        let data = "Sex,Length,Height\nM,0.4,0.1\nF,0.5,0.12\nI,0.3,0.08\n";
        let (_dir, config) = setup(data);
        let result = train_and_save(&config);
        assert!(matches!(result, Err(PredictorError::MissingColumn(_))));
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn test_blank_ring_count_is_rejected() {
        let data = TEN_ROWS.replacen(",15\n", ",\n", 1);
        let (_dir, config) = setup(&data);
        let result = train_and_save(&config);
        assert!(matches!(result, Err(PredictorError::InvalidInput(_))));
        assert!(!config.out_dir.exists());
    }

    #[test]
    fn test_failed_metadata_write_removes_pipeline() {
        let (_dir, config) = setup(TEN_ROWS);
        let store = ArtifactStore::new(&config.out_dir);
        // A directory squatting on the metadata path makes the write fail
        fs::create_dir_all(store.metadata_path(&config.version)).unwrap();

        let result = train_and_save(&config);
        assert!(matches!(result, Err(PredictorError::Io(_))));
        assert!(!store.pipeline_path(&config.version).exists());
    }

    #[test]
    fn test_training_outliers_are_counted() {
        let mut data = TEN_ROWS.to_string();
        data.push_str("F,0.455,0.355,1.13,0.594,0.332,0.116,0.1335,8\n");
        let (_dir, config) = setup(&data);
        let report = train_and_save(&config).unwrap();
        let meta = load_metadata(&report.meta_path).unwrap();

        assert_eq!(meta.split.n_train + meta.split.n_valid, 11);
        assert!(meta.split.n_train_filtered <= meta.split.n_train);
        assert_eq!(meta.preprocessing.outlier_rule, "keep Height <= 0.35 on training only");
    }
}
