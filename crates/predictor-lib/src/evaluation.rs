//! Regression metrics

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Validation metrics recorded for a training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

/// Compute RMSE, MAE and R² of `y_pred` against `y_true`
///
/// When `y_true` is constant R² is 1.0 for a perfect prediction and 0.0
/// otherwise, so the result is always finite for finite inputs.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<RegressionMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(PredictorError::InvalidInput(format!(
            "y_true has {} values but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PredictorError::InvalidInput(
            "cannot evaluate on zero samples".to_string(),
        ));
    }

    let n = y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let abs_err: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();

    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionMetrics {
        rmse: (ss_res / n).sqrt(),
        mae: abs_err / n,
        r2,
    })
}
