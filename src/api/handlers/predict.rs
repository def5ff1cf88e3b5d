//! Single-input prediction handler

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use super::ApiState;
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::features::FeatureVector;
use crate::predictor::PredictError;
use crate::types::{BlastObservation, SafetyLabel};

/// Response for `POST /api/v2/predict`
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub observation: BlastObservation,
    pub features: FeatureVector,
    pub ppv_mm_s: f64,
    pub safety: SafetyLabel,
    pub safety_code: &'static str,
    pub message: &'static str,
}

/// POST /api/v2/predict
pub async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<BlastObservation>, JsonRejection>,
) -> Response {
    let Json(obs) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return ApiErrorResponse::bad_request(format!("Invalid request: {}", rejection.body_text()));
        }
    };

    if let Err(e) = state.config.input.check(&obs) {
        return ApiErrorResponse::invalid_input(e.to_string());
    }

    match state.predictor.predict(&obs) {
        Ok(prediction) => {
            let result = prediction.result;
            info!(
                distance_m = obs.distance_m,
                charge_kg = obs.charge_kg,
                rock = %obs.rock_type,
                ppv = result.ppv_mm_s,
                safety = %result.safety,
                "PPV predicted"
            );
            ApiResponse::ok(PredictResponse {
                observation: obs,
                features: prediction.features,
                ppv_mm_s: result.ppv_mm_s,
                safety: result.safety,
                safety_code: result.safety.short_code(),
                message: result.safety.message(),
            })
        }
        Err(e @ PredictError::Feature { .. }) => ApiErrorResponse::invalid_input(e.to_string()),
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            ApiErrorResponse::internal(format!("Prediction failed: {e}"))
        }
    }
}
