//! HTTP service answering single-abalone age predictions

pub mod api;
pub mod config;

pub use api::{create_router, serve, AppState, SERVICE_VERSION};
pub use config::ServiceConfig;
