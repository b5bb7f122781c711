//! Summary statistics over a batch of predictions

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Number of leading predictions included in a summary
pub const HEAD_LEN: usize = 5;

/// Result of a batch prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub n_rows: usize,
    pub pred_head: Vec<f64>,
    pub pred_mean: f64,
    /// Population standard deviation
    pub pred_std: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<String>,
}

impl PredictionSummary {
    pub fn from_predictions(predictions: &[f64]) -> Result<Self> {
        if predictions.is_empty() {
            return Err(PredictorError::InvalidInput(
                "no rows to predict".to_string(),
            ));
        }
        let n = predictions.len() as f64;
        let mean = predictions.iter().sum::<f64>() / n;
        let var = predictions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

        Ok(Self {
            n_rows: predictions.len(),
            pred_head: predictions.iter().take(HEAD_LEN).copied().collect(),
            pred_mean: mean,
            pred_std: var.sqrt(),
            saved: None,
        })
    }
}
