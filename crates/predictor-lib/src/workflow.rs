//! Train-then-score flow over a single data source

use crate::error::Result;
use crate::predictor::{predict_csv, PredictionSummary};
use crate::training::{train_and_save, TrainingConfig, TrainingReport};
use serde::{Deserialize, Serialize};
use tracing::info;

/// File name of the scored copy written by [`run_flow`]
pub const PREDICTIONS_FILE: &str = "predictions.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    pub training: TrainingReport,
    pub prediction: PredictionSummary,
}

/// Train and persist a pipeline, then score the same data with it
///
/// Predictions land in `<out_dir>/predictions.csv`.
pub fn run_flow(config: &TrainingConfig) -> Result<FlowReport> {
    info!(
        version = %config.version,
        data_path = %config.data_path.display(),
        "Starting training flow"
    );

    let training = train_and_save(config)?;
    let output = config.out_dir.join(PREDICTIONS_FILE);
    let prediction = predict_csv(&training.pipeline_path, &config.data_path, Some(&output))?;

    Ok(FlowReport {
        training,
        prediction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;
    use crate::error::PredictorError;
    use crate::models::PREDICTION_COL;
    use std::fs;
    use tempfile::TempDir;

    const DATA: &str = "\
Sex,Length,Diameter,Height,Whole weight,Shucked weight,Viscera weight,Shell weight,Rings
M,0.455,0.365,0.095,0.514,0.2245,0.101,0.15,15
M,0.35,0.265,0.09,0.2255,0.0995,0.0485,0.07,7
F,0.53,0.42,0.135,0.677,0.2565,0.1415,0.21,9
M,0.44,0.365,0.125,0.516,0.2155,0.114,0.155,10
I,0.33,0.255,0.08,0.205,0.0895,0.0395,0.055,7
I,0.425,0.3,0.095,0.3515,0.141,0.0775,0.12,8
F,0.53,0.415,0.15,0.7775,0.237,0.1415,0.33,20
F,0.545,0.425,0.125,0.768,0.294,0.1495,0.26,16
";

    #[test]
    fn test_flow_writes_predictions() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("abalone.csv");
        fs::write(&data_path, DATA).unwrap();
        let mut config = TrainingConfig::new(&data_path, dir.path().join("models"), "v0.0.1");
        config.alpha = 0.5;

        let report = run_flow(&config).unwrap();
        assert!(report.training.pipeline_path.exists());
        assert_eq!(report.prediction.n_rows, 8);

        let saved = report.prediction.saved.clone().unwrap();
        let scored = read_csv(&saved).unwrap();
        assert!(scored.has_column(PREDICTION_COL));
        assert!(scored.has_column("Rings"));
    }

    #[test]
    fn test_flow_stops_on_training_failure() {
        let dir = TempDir::new().unwrap();
        let config = TrainingConfig::new(dir.path().join("nope.csv"), dir.path().join("m"), "v1");
        assert!(matches!(run_flow(&config), Err(PredictorError::Io(_))));
        assert!(!dir.path().join("m").join(PREDICTIONS_FILE).exists());
    }
}
