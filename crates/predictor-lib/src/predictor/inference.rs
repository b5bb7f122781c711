//! Batch inference with a persisted pipeline

use super::output::PredictionSummary;
use super::Predictor;
use crate::artifact::load_pipeline;
use crate::dataset::{read_csv, write_csv, Column, ColumnData, Frame};
use crate::error::Result;
use crate::models::{LEAKAGE_COLS, PREDICTION_COL};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Remove target and ring count columns if present
pub fn strip_leakage_columns(frame: &Frame) -> Frame {
    frame.drop_columns(&LEAKAGE_COLS)
}

/// Predict ages for every row of `frame`, ignoring leakage columns
pub fn predict_frame<P: Predictor + ?Sized>(predictor: &P, frame: &Frame) -> Result<Vec<f64>> {
    let start = Instant::now();
    let features = strip_leakage_columns(frame);
    let predictions = predictor.predict(&features)?;

    let elapsed = start.elapsed();
    if elapsed.as_millis() > 100 {
        warn!(
            rows = frame.n_rows(),
            latency_ms = elapsed.as_millis() as u64,
            "Slow batch prediction"
        );
    } else {
        debug!(
            rows = frame.n_rows(),
            latency_us = elapsed.as_micros() as u64,
            "Batch prediction completed"
        );
    }
    Ok(predictions)
}

/// Score a CSV file with the pipeline at `pipeline_path`
///
/// When `output_path` is given the input columns plus `pred_age` are written
/// there and the path is recorded in the summary.
pub fn predict_csv(
    pipeline_path: impl AsRef<Path>,
    data_path: impl AsRef<Path>,
    output_path: Option<&Path>,
) -> Result<PredictionSummary> {
    let pipeline = load_pipeline(pipeline_path.as_ref())?;
    let frame = read_csv(data_path.as_ref())?;

    let predictions = predict_frame(&pipeline, &frame)?;
    let mut summary = PredictionSummary::from_predictions(&predictions)?;

    if let Some(out) = output_path {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut scored = frame;
        scored.set_column(Column::new(PREDICTION_COL, ColumnData::Float(predictions)))?;
        write_csv(&scored, out)?;
        summary.saved = Some(out.display().to_string());
    }

    info!(
        data_path = %data_path.as_ref().display(),
        n_rows = summary.n_rows,
        pred_mean = summary.pred_mean,
        saved = ?summary.saved,
        "Batch prediction finished"
    );
    Ok(summary)
}
