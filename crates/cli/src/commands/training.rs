//! Local training and batch prediction commands

use anyhow::{Context, Result};
use colored::Colorize;
use predictor_lib::{
    predictor::predict_csv, run_flow, train_and_save, FlowReport, PredictionSummary,
    TrainingConfig, TrainingReport,
};
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_r2, format_age, format_metric, print_info, print_json, print_success, print_table,
    OutputFormat,
};

/// Row for the validation metrics table
#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Validation")]
    value: String,
}

/// Row for the prediction head table
#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "Predicted age")]
    age: String,
}

/// Train a pipeline and persist it
pub fn train(config: &TrainingConfig, format: OutputFormat) -> Result<()> {
    let report = train_and_save(config)
        .with_context(|| format!("Training on {} failed", config.data_path.display()))?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_training_report(&report),
    }
    Ok(())
}

/// Score a CSV file with a persisted pipeline
pub fn predict(
    pipeline: &Path,
    data: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let summary = predict_csv(pipeline, data, output)
        .with_context(|| format!("Prediction on {} failed", data.display()))?;

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => print_prediction_summary(&summary),
    }
    Ok(())
}

/// Train, then score the training data with the new pipeline
pub fn flow(config: &TrainingConfig, format: OutputFormat) -> Result<()> {
    let report: FlowReport = run_flow(config).context("Flow failed")?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_training_report(&report.training);
            println!();
            print_prediction_summary(&report.prediction);
        }
    }
    Ok(())
}

fn print_training_report(report: &TrainingReport) {
    println!("{}", "Training Report".bold());
    println!("{}", "=".repeat(50));
    print_table(&[
        MetricRow {
            metric: "RMSE",
            value: format_metric(report.metrics.rmse),
        },
        MetricRow {
            metric: "MAE",
            value: format_metric(report.metrics.mae),
        },
        MetricRow {
            metric: "R²",
            value: color_r2(report.metrics.r2),
        },
    ]);
    print_success(&format!("Pipeline saved to {}", report.pipeline_path.display()));
    print_success(&format!("Metadata saved to {}", report.meta_path.display()));
}

fn print_prediction_summary(summary: &PredictionSummary) {
    println!("{}", "Prediction Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Rows:                   {}", summary.n_rows);
    println!("Mean age:               {}", format_age(summary.pred_mean).cyan());
    println!("Std dev:                {}", format_metric(summary.pred_std));
    println!();

    let rows: Vec<PredictionRow> = summary
        .pred_head
        .iter()
        .enumerate()
        .map(|(row, age)| PredictionRow {
            row,
            age: format_age(*age),
        })
        .collect();
    print_table(&rows);

    match &summary.saved {
        Some(path) => print_success(&format!("Predictions written to {}", path)),
        None => print_info("Predictions were not saved (use --output to write a CSV)"),
    }
}
