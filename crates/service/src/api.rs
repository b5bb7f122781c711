//! HTTP API for age predictions, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    load_pipeline,
    observability::{ServiceMetrics, StructuredLogger},
    predictor::predict_frame,
    AbaloneInput, ErrorResponse, HealthResponse, ModelPipeline, PredictionOutput,
    PredictorError, RootResponse,
};
use prometheus::{Encoder, TextEncoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state
///
/// The pipeline is loaded at most once. A failed load leaves the cell empty,
/// so the next request tries again.
pub struct AppState {
    pipeline_path: PathBuf,
    pipeline: OnceCell<Arc<ModelPipeline>>,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(pipeline_path: impl Into<PathBuf>) -> Self {
        Self {
            pipeline_path: pipeline_path.into(),
            pipeline: OnceCell::new(),
            metrics: ServiceMetrics::new(),
            logger: StructuredLogger::new("age-service"),
        }
    }

    pub fn pipeline_path(&self) -> &Path {
        &self.pipeline_path
    }

    /// The fitted pipeline, loading it on first use
    pub async fn pipeline(&self) -> Result<Arc<ModelPipeline>, PredictorError> {
        self.pipeline
            .get_or_try_init(|| self.load())
            .await
            .cloned()
    }

    async fn load(&self) -> Result<Arc<ModelPipeline>, PredictorError> {
        let path = self.pipeline_path.clone();
        let display = path.display().to_string();
        let start = Instant::now();

        let loaded = tokio::task::spawn_blocking(move || load_pipeline(&path))
            .await
            .map_err(|e| PredictorError::artifact_load(&self.pipeline_path, e))?;

        let duration_ms = start.elapsed().as_millis() as u64;
        match loaded {
            Ok(pipeline) => {
                self.metrics.set_model_loaded(&display);
                self.logger.log_model_loaded(&display, duration_ms, true);
                Ok(Arc::new(pipeline))
            }
            Err(e) => {
                self.metrics.set_model_unloaded();
                self.logger.log_model_loaded(&display, duration_ms, false);
                Err(e)
            }
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

/// Liveness check
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        health_check: "App up and running!".to_string(),
        version: SERVICE_VERSION.to_string(),
    })
}

/// Health check - 200 when the pipeline is loadable, 503 otherwise
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse::healthy(
                state.pipeline_path().display().to_string(),
            )),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy(e.to_string())),
            )
        }
    }
}

/// Predict the age of a single abalone
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AbaloneInput>,
) -> Result<(StatusCode, Json<PredictionOutput>), ApiError> {
    let start = Instant::now();

    if let Err(e) = input.validate() {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    let predicted_age = match run_prediction(&state, &input).await {
        Ok(age) => age,
        Err(e) => {
            state.metrics.inc_prediction_errors();
            error!(error = %e, "Prediction failed");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction failed: {}", e),
            ));
        }
    };

    let elapsed = start.elapsed();
    state.metrics.observe_prediction_latency(elapsed.as_secs_f64());
    state.metrics.inc_predictions();
    state
        .logger
        .log_prediction(input.sex.as_str(), predicted_age, elapsed.as_micros() as u64);

    Ok((StatusCode::CREATED, Json(PredictionOutput { predicted_age })))
}

async fn run_prediction(state: &AppState, input: &AbaloneInput) -> Result<f64, PredictorError> {
    let pipeline = state.pipeline().await?;
    let frame = input.to_frame()?;
    let predictions = predict_frame(pipeline.as_ref(), &frame)?;
    predictions
        .first()
        .copied()
        .ok_or_else(|| PredictorError::InvalidInput("pipeline returned no prediction".into()))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
