//! Core data models shared by the service and the CLI

use crate::dataset::{Column, ColumnData, Frame};
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived regression target
pub const TARGET_COL: &str = "Age";
/// Raw age-proxy count the target is derived from
pub const RINGS_COL: &str = "Rings";
pub const HEIGHT_COL: &str = "Height";
pub const SEX_COL: &str = "Sex";
/// Column appended to batch prediction output
pub const PREDICTION_COL: &str = "pred_age";

/// Columns never passed to the model at inference time
pub const LEAKAGE_COLS: [&str; 2] = [TARGET_COL, RINGS_COL];

/// Abalone sex: male, female or infant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
    I,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::I => "I",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M" | "m" => Ok(Sex::M),
            "F" | "f" => Ok(Sex::F),
            "I" | "i" => Ok(Sex::I),
            other => Err(PredictorError::InvalidInput(format!(
                "Sex must be one of M, F, I; got `{}`",
                other
            ))),
        }
    }
}

/// Single-abalone prediction request
///
/// Field names on the wire match the training CSV header. The underscore
/// spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbaloneInput {
    #[serde(rename = "Sex")]
    pub sex: Sex,
    /// Longest shell measurement (mm)
    #[serde(rename = "Length")]
    pub length: f64,
    /// Perpendicular to length (mm)
    #[serde(rename = "Diameter")]
    pub diameter: f64,
    /// With meat in shell (mm)
    #[serde(rename = "Height")]
    pub height: f64,
    /// Whole abalone weight (grams)
    #[serde(rename = "Whole weight", alias = "Whole_weight")]
    pub whole_weight: f64,
    /// Weight of meat (grams)
    #[serde(rename = "Shucked weight", alias = "Shucked_weight")]
    pub shucked_weight: f64,
    /// Gut weight after bleeding (grams)
    #[serde(rename = "Viscera weight", alias = "Viscera_weight")]
    pub viscera_weight: f64,
    /// Weight after being dried (grams)
    #[serde(rename = "Shell weight", alias = "Shell_weight")]
    pub shell_weight: f64,
}

impl AbaloneInput {
    /// Measurement columns in CSV order
    pub const MEASUREMENTS: [&'static str; 7] = [
        "Length",
        "Diameter",
        "Height",
        "Whole weight",
        "Shucked weight",
        "Viscera weight",
        "Shell weight",
    ];

    /// The documented example payload
    pub fn example() -> Self {
        Self {
            sex: Sex::M,
            length: 0.455,
            diameter: 0.365,
            height: 0.095,
            whole_weight: 0.514,
            shucked_weight: 0.2245,
            viscera_weight: 0.101,
            shell_weight: 0.15,
        }
    }

    fn measurements(&self) -> [f64; 7] {
        [
            self.length,
            self.diameter,
            self.height,
            self.whole_weight,
            self.shucked_weight,
            self.viscera_weight,
            self.shell_weight,
        ]
    }

    /// Every measurement must be a finite number greater than zero
    pub fn validate(&self) -> Result<()> {
        for (name, value) in Self::MEASUREMENTS.iter().zip(self.measurements()) {
            if !value.is_finite() || value <= 0.0 {
                return Err(PredictorError::InvalidInput(format!(
                    "`{}` must be greater than 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// One-row frame in the shape the pipeline was trained on
    pub fn to_frame(&self) -> Result<Frame> {
        let mut columns = vec![Column::new(
            SEX_COL,
            ColumnData::Text(vec![self.sex.as_str().to_string()]),
        )];
        for (name, value) in Self::MEASUREMENTS.iter().zip(self.measurements()) {
            columns.push(Column::new(*name, ColumnData::Float(vec![value])));
        }
        Frame::new(columns)
    }
}

/// Single prediction response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    /// Predicted age (years)
    pub predicted_age: f64,
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub health_check: String,
    pub version: String,
}

/// Model availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Healthy,
    Unhealthy,
}

/// Extended health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ModelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy(pipeline_path: impl Into<String>) -> Self {
        Self {
            status: ModelStatus::Healthy,
            model_loaded: Some(true),
            pipeline_path: Some(pipeline_path.into()),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: ModelStatus::Unhealthy,
            model_loaded: None,
            pipeline_path: None,
            error: Some(error.into()),
        }
    }
}

/// Error body returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
