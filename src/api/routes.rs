//! API route definitions
//!
//! - /health - legacy liveness probe
//! - /api/v2/system/health - service status (enveloped)
//! - /api/v2/model - loaded model metadata and feature columns
//! - /api/v2/inputs - input limits, defaults and rock types for the form
//! - /api/v2/predict - single-input prediction
//! - /api/v2/batch - CSV in, annotated CSV download out
//! - /api/v2/batch/preview - CSV in, first rows + totals out

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Build the v2 API router.
pub fn v2_api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/system/health", get(handlers::system_health))
        .route("/model", get(handlers::model_info))
        .route("/inputs", get(handlers::input_form))
        .route("/predict", post(handlers::predict))
        .route("/batch", post(handlers::batch_download))
        .route("/batch/preview", post(handlers::batch_preview))
        .with_state(state)
}

/// Legacy health endpoint at root level
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::legacy_health_check))
        .with_state(state)
}
