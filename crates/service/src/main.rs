//! Age service - serves a fitted abalone age pipeline over HTTP

use age_service::{serve, AppState, ServiceConfig, SERVICE_VERSION};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServiceConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        pipeline_path = %config.pipeline_path.display(),
        eager_load = config.eager_load,
        "Service configured"
    );

    let state = Arc::new(AppState::new(&config.pipeline_path));

    if config.eager_load {
        // Startup continues without a model; /health reports 503 until it loads
        if let Err(e) = state.pipeline().await {
            warn!(error = %e, "Eager pipeline load failed");
        }
    }

    let addr = config.bind_addr();
    let logger = state.logger.clone();
    logger.log_startup(
        SERVICE_VERSION,
        &addr,
        &config.pipeline_path.display().to_string(),
    );

    serve(&addr, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    Ok(())
}
