//! Linear regressor: `intercept + Σ coefficients[i] × x[i]`

use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::features::FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub intercept: f64,
    /// One weight per feature column, in `FEATURE_COLUMNS` order
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::InvalidStructure(format!(
                "linear model has {} coefficients, expected {FEATURE_COUNT}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidStructure(
                "linear model weights must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn evaluate(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        self.coefficients
            .iter()
            .zip(row.iter())
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}
