//! Prediction service: feature derivation → model → rounding → safety zone
//!
//! `PpvPredictor` owns an immutable model handle injected at construction.
//! It holds no mutable state, so one instance is shared across all requests.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::features::{self, FeatureError, FeatureVector};
use crate::model::{check_feature_schema, ModelError, Regressor};
use crate::safety;
use crate::types::thresholds::PPV_DECIMALS;
use crate::types::{BlastObservation, PredictionResult};

#[derive(Debug, Error)]
pub enum PredictError {
    /// `index` is the position of the offending observation in the request
    #[error("observation {index}: {source}")]
    Feature {
        index: usize,
        #[source]
        source: FeatureError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned {got} predictions for {expected} rows")]
    LengthMismatch { expected: usize, got: usize },
}

/// Full output of one prediction: the features fed to the model and the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub features: FeatureVector,
    pub result: PredictionResult,
}

/// Round half away from zero to `PPV_DECIMALS` places.
pub fn round_ppv(value: f64) -> f64 {
    let scale = 10_f64.powi(PPV_DECIMALS);
    (value * scale).round() / scale
}

#[derive(Clone)]
pub struct PpvPredictor {
    model: Arc<dyn Regressor>,
}

impl PpvPredictor {
    /// Wrap a model, refusing one trained on a different feature schema.
    pub fn new(model: Arc<dyn Regressor>) -> Result<Self, ModelError> {
        check_feature_schema(model.feature_names())?;
        info!(model = model.name(), "Predictor ready");
        Ok(Self { model })
    }

    /// Predict one observation.
    pub fn predict(&self, obs: &BlastObservation) -> Result<Prediction, PredictError> {
        let features =
            features::derive(obs).map_err(|source| PredictError::Feature { index: 0, source })?;
        let raw = self.model.predict(&features)?;
        let prediction = Self::finish(features, raw);
        debug!(
            distance_m = obs.distance_m,
            charge_kg = obs.charge_kg,
            rock = %obs.rock_type,
            ppv = prediction.result.ppv_mm_s,
            safety = %prediction.result.safety,
            "Prediction complete"
        );
        Ok(prediction)
    }

    /// Predict many observations with a single bulk model call.
    ///
    /// Fails as a whole on the first invalid observation.
    pub fn predict_all(&self, observations: &[BlastObservation]) -> Result<Vec<Prediction>, PredictError> {
        let rows = observations
            .iter()
            .enumerate()
            .map(|(index, obs)| {
                features::derive(obs).map_err(|source| PredictError::Feature { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let raw = self.model.predict_batch(&rows)?;
        if raw.len() != rows.len() {
            return Err(PredictError::LengthMismatch {
                expected: rows.len(),
                got: raw.len(),
            });
        }

        Ok(rows
            .into_iter()
            .zip(raw)
            .map(|(features, value)| Self::finish(features, value))
            .collect())
    }

    fn finish(features: FeatureVector, raw: f64) -> Prediction {
        let ppv_mm_s = round_ppv(raw);
        Prediction {
            features,
            result: PredictionResult {
                ppv_mm_s,
                safety: safety::classify(ppv_mm_s),
            },
        }
    }
}
