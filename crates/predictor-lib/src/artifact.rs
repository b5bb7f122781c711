//! Versioned persistence of fitted pipelines and their training metadata
//!
//! A training run writes two sibling files into the artifact directory:
//! - `pipeline__<version>.bin`: bincode-encoded fitted pipeline
//! - `meta__<version>.json`: pretty-printed provenance document

use crate::error::{PredictorError, Result};
use crate::evaluation::RegressionMetrics;
use crate::predictor::ModelPipeline;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bumped whenever the persisted pipeline layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PipelineEnvelopeRef<'a> {
    format_version: u32,
    pipeline: &'a ModelPipeline,
}

#[derive(Deserialize)]
struct PipelineEnvelope {
    format_version: u32,
    pipeline: ModelPipeline,
}

/// Directory holding versioned artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

/// Location and checksum of a written pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPipeline {
    pub path: PathBuf,
    pub sha256: String,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pipeline_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("pipeline__{}.bin", version))
    }

    pub fn metadata_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("meta__{}.json", version))
    }

    /// Serialize a fitted pipeline as `pipeline__<version>.bin`
    pub fn save_pipeline(&self, pipeline: &ModelPipeline, version: &str) -> Result<SavedPipeline> {
        validate_version(version)?;
        if !pipeline.is_fitted() {
            return Err(PredictorError::NotFitted);
        }

        fs::create_dir_all(&self.dir)?;
        let envelope = PipelineEnvelopeRef {
            format_version: ARTIFACT_FORMAT_VERSION,
            pipeline,
        };
        let bytes = bincode::serialize(&envelope)?;
        let path = self.pipeline_path(version);
        fs::write(&path, &bytes)?;

        let sha256 = hex::encode(Sha256::digest(&bytes));
        info!(path = %path.display(), size_bytes = bytes.len(), sha256 = %sha256, "Pipeline saved");
        Ok(SavedPipeline { path, sha256 })
    }

    /// Write `meta__<version>.json`
    pub fn save_metadata(&self, metadata: &TrainingMetadata) -> Result<PathBuf> {
        validate_version(&metadata.version)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.metadata_path(&metadata.version);
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "Metadata saved");
        Ok(path)
    }
}

/// Versions become part of file names, so they must be plain names
fn validate_version(version: &str) -> Result<()> {
    let invalid = version.is_empty()
        || version == "."
        || version == ".."
        || version.contains(['/', '\\']);
    if invalid {
        return Err(PredictorError::InvalidInput(format!(
            "version `{}` cannot be used in an artifact file name",
            version
        )));
    }
    Ok(())
}

/// Load a fitted pipeline written by [`ArtifactStore::save_pipeline`]
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<ModelPipeline> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| PredictorError::artifact_load(path, e))?;

    let envelope: PipelineEnvelope = bincode::deserialize(&bytes)
        .map_err(|e| PredictorError::artifact_load(path, format!("corrupt artifact: {}", e)))?;

    if envelope.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(PredictorError::artifact_load(
            path,
            format!(
                "unsupported format version {} (expected {})",
                envelope.format_version, ARTIFACT_FORMAT_VERSION
            ),
        ));
    }
    if !envelope.pipeline.is_fitted() {
        return Err(PredictorError::artifact_load(
            path,
            "artifact holds an unfitted pipeline",
        ));
    }

    debug!(path = %path.display(), "Pipeline loaded");
    Ok(envelope.pipeline)
}

/// SHA-256 of a file, hex encoded
pub fn file_checksum(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Read a metadata document back
pub fn load_metadata(path: impl AsRef<Path>) -> Result<TrainingMetadata> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Provenance of a training run, one-to-one with a pipeline artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub version: String,
    pub data_path: String,
    pub artifacts: ArtifactInfo,
    pub metrics_valid: RegressionMetrics,
    pub split: SplitInfo,
    pub model: ModelInfo,
    pub preprocessing: PreprocessingInfo,
    pub meta: EnvironmentInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub pipeline: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitInfo {
    pub test_size: f64,
    pub random_state: u64,
    pub n_train: usize,
    /// Training rows left after outlier filtering
    pub n_train_filtered: usize,
    pub n_valid: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename = "type")]
    pub model_type: String,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingInfo {
    pub one_hot_drop: String,
    pub handle_unknown: String,
    pub scaler: String,
    pub categorical_cols: Vec<String>,
    pub numerical_cols: Vec<String>,
    pub outlier_rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub crate_version: String,
    pub os: String,
    pub arch: String,
    pub timestamp_utc: String,
}

impl EnvironmentInfo {
    pub fn current() -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            timestamp_utc: chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, ColumnData, Frame};
    use crate::predictor::{build_model_pipeline, build_preprocessor};
    use tempfile::TempDir;

    fn fitted_pipeline() -> (ModelPipeline, Frame) {
        let frame = Frame::new(vec![
            Column::new(
                "Sex",
                ColumnData::Text(vec!["M".into(), "F".into(), "I".into(), "M".into()]),
            ),
            Column::new("Length", ColumnData::Float(vec![0.45, 0.53, 0.33, 0.6])),
        ])
        .unwrap();
        let mut pipe = build_model_pipeline(
            build_preprocessor(vec!["Sex".into()], vec!["Length".into()]),
            1.0,
        )
        .unwrap();
        pipe.fit(&frame, &[16.5, 10.5, 8.5, 14.0]).unwrap();
        (pipe, frame)
    }

    #[test]
    fn test_paths_follow_naming_convention() {
        let store = ArtifactStore::new("/models");
        assert_eq!(
            store.pipeline_path("v0.0.1"),
            PathBuf::from("/models/pipeline__v0.0.1.bin")
        );
        assert_eq!(
            store.metadata_path("v0.0.1"),
            PathBuf::from("/models/meta__v0.0.1.json")
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));
        let (pipe, frame) = fitted_pipeline();

        let saved = store.save_pipeline(&pipe, "v1").unwrap();
        assert!(saved.path.exists());
        assert_eq!(saved.sha256, file_checksum(&saved.path).unwrap());

        let loaded = load_pipeline(&saved.path).unwrap();
        assert_eq!(loaded, pipe);
        assert_eq!(loaded.predict(&frame).unwrap(), pipe.predict(&frame).unwrap());
    }

    #[test]
    fn test_unfitted_pipeline_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let pipe = build_model_pipeline(build_preprocessor(vec![], vec![]), 1.0).unwrap();
        assert!(matches!(
            store.save_pipeline(&pipe, "v1"),
            Err(PredictorError::NotFitted)
        ));
        assert!(!store.pipeline_path("v1").exists());
    }

    #[test]
    fn test_missing_file_is_artifact_load_error() {
        let dir = TempDir::new().unwrap();
        let result = load_pipeline(dir.path().join("pipeline__nope.bin"));
        assert!(matches!(result, Err(PredictorError::ArtifactLoad { .. })));
    }

    #[test]
    fn test_corrupt_file_is_artifact_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline__bad.bin");
        fs::write(&path, b"definitely not a pipeline").unwrap();
        assert!(matches!(
            load_pipeline(&path),
            Err(PredictorError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_rejects_path_like_versions() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (pipe, _) = fitted_pipeline();
        assert!(store.save_pipeline(&pipe, "../escape").is_err());
        assert!(store.save_pipeline(&pipe, "").is_err());
    }

    #[test]
    fn test_environment_timestamp_format() {
        let env = EnvironmentInfo::current();
        assert_eq!(env.timestamp_utc.len(), "2024-01-01T00-00-00Z".len());
        assert!(env.timestamp_utc.ends_with('Z'));
    }
}
