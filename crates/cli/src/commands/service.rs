//! Commands that talk to a running age service

use anyhow::Result;
use colored::Colorize;
use predictor_lib::{AbaloneInput, ModelStatus};

use crate::client::ApiClient;
use crate::output::{color_status, format_age, print_error, print_json, OutputFormat};

/// Ask the service for the age of one abalone
///
/// Failures are shown like a form would show them, then returned.
pub async fn ask(client: &ApiClient, input: &AbaloneInput, format: OutputFormat) -> Result<()> {
    match client.predict(input).await {
        Ok(output) => match format {
            OutputFormat::Json => print_json(&output)?,
            OutputFormat::Table => {
                println!(
                    "{} {}",
                    "Predicted age:".bold(),
                    format_age(output.predicted_age).green()
                );
            }
        },
        Err(e) => {
            print_error(&e.to_string());
            return Err(e);
        }
    }
    Ok(())
}

/// Show the service health report
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            let status = match report.status {
                ModelStatus::Healthy => "healthy",
                ModelStatus::Unhealthy => "unhealthy",
            };
            println!("Status:                 {}", color_status(status));
            if let Some(path) = &report.pipeline_path {
                println!("Pipeline:               {}", path.cyan());
            }
            if let Some(error) = &report.error {
                println!("Error:                  {}", error.red());
            }
        }
    }
    Ok(())
}
