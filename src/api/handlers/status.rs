//! Status handlers: health, model metadata, input-form metadata

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::ApiState;
use crate::api::envelope::ApiResponse;
use crate::types::thresholds::safety_thresholds;
use crate::types::RockType;

// ============================================================================
// Health
// ============================================================================

/// Legacy health response at `/health`
#[derive(Debug, Serialize)]
pub struct LegacyHealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub uptime_seconds: u64,
}

/// GET /health
pub async fn legacy_health_check(State(state): State<ApiState>) -> Json<LegacyHealthResponse> {
    Json(LegacyHealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model_info.name.clone(),
        uptime_seconds: state.uptime_secs(),
    })
}

/// GET /api/v2/system/health
pub async fn system_health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model_info.name,
        "model_version": state.model_info.version,
        "started_at": state.started_at,
        "uptime_secs": state.uptime_secs(),
    }))
}

// ============================================================================
// Model
// ============================================================================

/// GET /api/v2/model
pub async fn model_info(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(state.model_info.as_ref())
}

// ============================================================================
// Input form metadata
// ============================================================================

#[derive(Debug, Serialize)]
pub struct InputFormInfo {
    pub min_distance_m: f64,
    pub min_charge_kg: f64,
    pub default_distance_m: f64,
    pub default_charge_kg: f64,
    pub rock_types: Vec<RockType>,
    pub safe_below_mm_s: f64,
    pub dangerous_above_mm_s: f64,
}

/// GET /api/v2/inputs
pub async fn input_form(State(state): State<ApiState>) -> Response {
    let limits = &state.config.input;
    ApiResponse::ok(InputFormInfo {
        min_distance_m: limits.min_distance_m,
        min_charge_kg: limits.min_charge_kg,
        default_distance_m: limits.default_distance_m,
        default_charge_kg: limits.default_charge_kg,
        rock_types: RockType::ALL.to_vec(),
        safe_below_mm_s: safety_thresholds::SAFE_BELOW_MM_S,
        dangerous_above_mm_s: safety_thresholds::DANGEROUS_ABOVE_MM_S,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::create_test_state;
    use super::*;

    #[tokio::test]
    async fn test_legacy_health_reports_model() {
        let state = create_test_state();
        let Json(body) = legacy_health_check(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.model, "test-linear");
    }
}
