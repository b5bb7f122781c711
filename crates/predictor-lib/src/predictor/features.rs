//! Feature engineering for training
//!
//! Derives the age target from the ring count, separates features from the
//! target, drops training-only outliers and decides which columns are
//! categorical and which are numerical.

use crate::dataset::{Column, ColumnData, Frame};
use crate::error::{PredictorError, Result};
use crate::models::{HEIGHT_COL, RINGS_COL, TARGET_COL};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Years added to the ring count to get the age
pub const DEFAULT_TARGET_OFFSET: f64 = 1.5;

/// Default training-only outlier threshold on `Height`
pub const DEFAULT_HEIGHT_THRESHOLD: f64 = 0.35;

/// Add `Age = Rings + offset`. Frames without `Rings` are returned unchanged.
///
/// Rows with a missing ring count get a missing (`NaN`) age.
pub fn add_target(frame: &Frame, offset: f64) -> Result<Frame> {
    let mut out = frame.clone();
    let Some(rings) = frame.column(RINGS_COL) else {
        return Ok(out);
    };

    let counts = rings.data.to_f64_vec().ok_or_else(|| {
        PredictorError::SchemaMismatch(format!(
            "`{}` must be numeric, found {}",
            RINGS_COL,
            rings.kind()
        ))
    })?;

    let age = counts.iter().map(|r| r + offset).collect();
    out.set_column(Column::new(TARGET_COL, ColumnData::Float(age)))?;
    Ok(out)
}

/// Split a frame into features and target values
///
/// Both the target and the raw ring count are removed from the features,
/// since the target is derived from the count.
pub fn split_features_target(frame: &Frame, target_col: &str) -> Result<(Frame, Vec<f64>)> {
    let target = frame.require(target_col)?;
    let values = target.data.to_f64_vec().ok_or_else(|| {
        PredictorError::SchemaMismatch(format!(
            "target `{}` must be numeric, found {}",
            target_col,
            target.kind()
        ))
    })?;

    let features = frame.drop_columns(&[target_col, RINGS_COL]);
    Ok((features, values))
}

/// Keep-rows rule applied to the training partition only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRule {
    pub column: String,
    pub threshold: f64,
}

impl Default for OutlierRule {
    fn default() -> Self {
        Self {
            column: HEIGHT_COL.to_string(),
            threshold: DEFAULT_HEIGHT_THRESHOLD,
        }
    }
}

impl OutlierRule {
    pub fn describe(&self) -> String {
        format!(
            "keep {} <= {} on training only",
            self.column, self.threshold
        )
    }
}

/// Drop training rows whose `rule.column` value exceeds `rule.threshold`
///
/// Features and targets shrink in lockstep. Missing values never satisfy the
/// rule and are dropped. If the column is absent the input is returned as is.
pub fn filter_training_outliers(
    features: &Frame,
    targets: &[f64],
    rule: &OutlierRule,
) -> Result<(Frame, Vec<f64>)> {
    if features.n_rows() != targets.len() {
        return Err(PredictorError::InvalidInput(format!(
            "features have {} rows but targets have {}",
            features.n_rows(),
            targets.len()
        )));
    }

    let Some(column) = features.column(&rule.column) else {
        return Ok((features.clone(), targets.to_vec()));
    };

    let values = column.data.to_f64_vec().ok_or_else(|| {
        PredictorError::SchemaMismatch(format!(
            "outlier column `{}` must be numeric, found {}",
            rule.column,
            column.kind()
        ))
    })?;

    let keep: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v <= rule.threshold)
        .map(|(i, _)| i)
        .collect();

    debug!(
        column = %rule.column,
        threshold = rule.threshold,
        kept = keep.len(),
        dropped = values.len() - keep.len(),
        "Filtered training outliers"
    );

    let kept_targets = keep.iter().map(|&i| targets[i]).collect();
    Ok((features.take_rows(&keep), kept_targets))
}

/// Column names split by how they are preprocessed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub categorical: Vec<String>,
    pub numerical: Vec<String>,
}

/// Text columns are categorical, integer and float columns are numerical
pub fn infer_column_roles(features: &Frame) -> ColumnRoles {
    let mut roles = ColumnRoles::default();
    for column in features.columns() {
        if column.kind().is_numeric() {
            roles.numerical.push(column.name.clone());
        } else {
            roles.categorical.push(column.name.clone());
        }
    }
    roles
}
