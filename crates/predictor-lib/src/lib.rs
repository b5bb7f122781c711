//! Abalone age regression library
//!
//! This crate provides the core functionality for:
//! - CSV loading into typed frames and seeded train/validation splits
//! - Feature engineering and a standardize/one-hot/ridge pipeline
//! - Training runs with versioned artifacts and metadata
//! - Batch and single-record inference
//! - Metrics and structured logging for the service

pub mod artifact;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod training;
pub mod workflow;

pub use artifact::{load_pipeline, ArtifactStore, TrainingMetadata};
pub use error::{PredictorError, Result};
pub use evaluation::{evaluate, RegressionMetrics};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::{ModelPipeline, PredictionSummary, Predictor};
pub use training::{train_and_save, TrainingConfig, TrainingReport};
pub use workflow::{run_flow, FlowReport};
