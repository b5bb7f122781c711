//! Abalone Age Predictor CLI
//!
//! A command-line tool for training the age pipeline, scoring CSV files,
//! and querying a running age service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{service, training};
use predictor_lib::{AbaloneInput, Sex, TrainingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Abalone Age Predictor CLI
#[derive(Parser)]
#[command(name = "abalone")]
#[command(author, version, about = "CLI for the Abalone Age Predictor", long_about = None)]
pub struct Cli {
    /// Age service URL (can also be set via ABALONE_API_URL env var)
    #[arg(long, env = "ABALONE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a pipeline and write its artifact and metadata
    Train(TrainArgs),

    /// Score a CSV file with a persisted pipeline
    Predict {
        /// Pipeline artifact to load
        #[arg(long)]
        pipeline: PathBuf,

        /// CSV file to score
        #[arg(long)]
        data: PathBuf,

        /// Write the input plus a pred_age column here
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Train, then score the training data with the new pipeline
    Flow(TrainArgs),

    /// Ask the running service for the age of one abalone
    Ask(AskArgs),

    /// Show the running service's health
    Health,
}

#[derive(Args)]
pub struct TrainArgs {
    /// Training CSV
    #[arg(long)]
    pub data: PathBuf,

    /// Artifact directory (defaults to the config file, then "models")
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Artifact version (defaults to the config file, then "v0.0.1")
    #[arg(long = "model-version")]
    pub model_version: Option<String>,

    /// Fraction of rows held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the train/validation shuffle
    #[arg(long, default_value_t = 42)]
    pub random_state: u64,

    /// Ridge regularization strength
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,
}

#[derive(Args)]
pub struct AskArgs {
    /// Sex: M, F or I (infant)
    #[arg(long, default_value = "M")]
    pub sex: Sex,

    #[arg(long, default_value_t = 0.5)]
    pub length: f64,

    #[arg(long, default_value_t = 0.4)]
    pub diameter: f64,

    #[arg(long, default_value_t = 0.15)]
    pub height: f64,

    #[arg(long, default_value_t = 0.8)]
    pub whole_weight: f64,

    #[arg(long, default_value_t = 0.3)]
    pub shucked_weight: f64,

    #[arg(long, default_value_t = 0.2)]
    pub viscera_weight: f64,

    #[arg(long, default_value_t = 0.2)]
    pub shell_weight: f64,
}

impl From<AskArgs> for AbaloneInput {
    fn from(args: AskArgs) -> Self {
        AbaloneInput {
            sex: args.sex,
            length: args.length,
            diameter: args.diameter,
            height: args.height,
            whole_weight: args.whole_weight,
            shucked_weight: args.shucked_weight,
            viscera_weight: args.viscera_weight,
            shell_weight: args.shell_weight,
        }
    }
}

fn training_config(args: TrainArgs, user: &config::Config) -> TrainingConfig {
    let mut config = TrainingConfig::new(
        args.data,
        user.out_dir(args.out_dir),
        user.version(args.model_version),
    );
    config.test_size = args.test_size;
    config.random_state = args.random_state;
    config.alpha = args.alpha;
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let user = config::Config::load()?;
    tracing::debug!(config = ?user, "Loaded user config");

    // Execute command
    match cli.command {
        Commands::Train(args) => {
            training::train(&training_config(args, &user), cli.format)?;
        }
        Commands::Predict {
            pipeline,
            data,
            output,
        } => {
            training::predict(&pipeline, &data, output.as_deref(), cli.format)?;
        }
        Commands::Flow(args) => {
            training::flow(&training_config(args, &user), cli.format)?;
        }
        Commands::Ask(args) => {
            let client = client::ApiClient::new(&user.api_url(cli.api_url))?;
            service::ask(&client, &args.into(), cli.format).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&user.api_url(cli.api_url))?;
            service::health(&client, cli.format).await?;
        }
    }

    Ok(())
}
