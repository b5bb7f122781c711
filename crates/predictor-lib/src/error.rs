//! Error taxonomy for the predictor library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictorError>;

/// Errors raised by data preparation, pipeline fitting, persistence and prediction
#[derive(Debug, Error)]
pub enum PredictorError {
    /// A required column is absent from the frame
    #[error("column `{0}` not found in frame")]
    MissingColumn(String),

    /// Prediction was requested before the pipeline was fitted
    #[error("pipeline is not fitted yet; call fit before predict")]
    NotFitted,

    /// Inference-time columns or types do not match what the pipeline saw at fit time
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A persisted pipeline could not be loaded
    #[error("failed to load pipeline artifact from {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// Input data is structurally valid but unusable (empty, non-finite, bad parameter)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The estimator could not be fitted
    #[error("fit failed: {0}")]
    Fit(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PredictorError {
    pub fn artifact_load(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        PredictorError::ArtifactLoad {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for PredictorError {
    fn from(err: bincode::Error) -> Self {
        PredictorError::Serialization(err.to_string())
    }
}
