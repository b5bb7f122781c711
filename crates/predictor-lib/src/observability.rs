//! Observability infrastructure for the age service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction counts, model state)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    model_loaded: IntGauge,
    model_version_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "age_service_prediction_latency_seconds",
                "Time spent answering a single prediction request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "age_service_predictions_total",
                "Total number of predictions served"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "age_service_prediction_errors_total",
                "Total number of failed prediction requests"
            )
            .expect("Failed to register prediction_errors_total"),

            model_loaded: register_int_gauge!(
                "age_service_model_loaded",
                "1 when a fitted pipeline is loaded, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),

            model_version_info: register_gauge_vec!(
                "age_service_model_version_info",
                "Artifact backing the loaded pipeline",
                &["pipeline_path"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Handle to the process-wide service metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    inner: &'static ServiceMetricsInner,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new),
        }
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner.prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner.predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner.prediction_errors_total.inc();
    }

    /// Mark the pipeline at `pipeline_path` as loaded
    pub fn set_model_loaded(&self, pipeline_path: &str) {
        self.inner.model_loaded.set(1);
        self.inner.model_version_info.reset();
        self.inner
            .model_version_info
            .with_label_values(&[pipeline_path])
            .set(1.0);
    }

    pub fn set_model_unloaded(&self) {
        self.inner.model_loaded.set(0);
    }

    pub fn predictions_total(&self) -> u64 {
        self.inner.predictions_total.get()
    }
}

/// Structured logger for service lifecycle events
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str, pipeline_path: &str) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            addr = %addr,
            pipeline_path = %pipeline_path,
            "Age service started"
        );
    }

    pub fn log_model_loaded(&self, pipeline_path: &str, duration_ms: u64, success: bool) {
        if success {
            info!(
                event = "model_loaded",
                service = %self.service_name,
                pipeline_path = %pipeline_path,
                duration_ms = duration_ms,
                "Pipeline loaded"
            );
        } else {
            warn!(
                event = "model_load_failed",
                service = %self.service_name,
                pipeline_path = %pipeline_path,
                duration_ms = duration_ms,
                "Pipeline could not be loaded, will retry on next request"
            );
        }
    }

    pub fn log_prediction(&self, sex: &str, predicted_age: f64, latency_us: u64) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            sex = %sex,
            predicted_age = predicted_age,
            latency_us = latency_us,
            "Served age prediction"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Age service shutting down"
        );
    }
}
