//! Age regression: feature engineering, preprocessing, ridge estimator and inference

mod features;
mod inference;
mod output;
mod pipeline;
mod preprocessing;
mod ridge;

pub use features::{
    add_target, filter_training_outliers, infer_column_roles, split_features_target, ColumnRoles,
    OutlierRule, DEFAULT_HEIGHT_THRESHOLD, DEFAULT_TARGET_OFFSET,
};
pub use inference::{predict_csv, predict_frame, strip_leakage_columns};
pub use output::{PredictionSummary, HEAD_LEN};
pub use pipeline::{build_model_pipeline, FittedState, ModelPipeline};
pub use preprocessing::{
    build_preprocessor, ColumnSchema, FittedPreprocessor, OneHotParams, Preprocessor,
    ScalerParams,
};
pub use ridge::{FittedRidge, Ridge};

use crate::dataset::Frame;
use crate::error::Result;

/// Anything that maps a feature frame to one prediction per row
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &Frame) -> Result<Vec<f64>>;
}
