//! API route handlers
//!
//! Request handling logic for all API endpoints:
//! - Service and model status, input-form metadata
//! - Single-input PPV prediction
//! - CSV batch scoring (download and preview)

mod batch;
mod predict;
mod status;

pub use batch::*;
pub use predict::*;
pub use status::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::model::ModelInfo;
use crate::predictor::PpvPredictor;

// ============================================================================
// API State
// ============================================================================

/// Shared, read-only state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Prediction pipeline holding the loaded model
    pub predictor: Arc<PpvPredictor>,
    /// Metadata of the loaded model artifact
    pub model_info: Arc<ModelInfo>,
    pub config: Arc<AppConfig>,
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(predictor: PpvPredictor, model_info: ModelInfo, config: AppConfig) -> Self {
        Self {
            predictor: Arc::new(predictor),
            model_info: Arc::new(model_info),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        u64::try_from((Utc::now() - self.started_at).num_seconds()).unwrap_or(0)
    }
}
