//! Model artifact loading and schema validation
//!
//! Artifact format (JSON):
//!
//! ```json
//! {
//!   "name": "ppv-xgboost",
//!   "version": "1",
//!   "feature_names": ["distance", "charge", "scaled_distance", "rock",
//!                     "distance_x_charge", "distance_squared", "charge_squared"],
//!   "model": { "kind": "tree_ensemble", "base_score": 0.5, "trees": [ ... ] }
//! }
//! ```
//!
//! `feature_names` must equal [`FEATURE_COLUMNS`](crate::features::FEATURE_COLUMNS) exactly (names, order and
//! count). Any difference means the artifact was trained on another feature
//! schema and is refused at load time rather than mis-predicting at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::{LinearModel, ModelError, Regressor, TreeEnsemble};
use crate::features::FeatureVector;

/// The regressor stored in an artifact, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::TreeEnsemble(_) => "tree_ensemble",
            ModelSpec::Linear(_) => "linear",
        }
    }
}

/// A validated, immutable pre-trained regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

/// Model metadata exposed through the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub kind: String,
    pub feature_names: Vec<String>,
}

impl ModelArtifact {
    /// Read, parse and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            model = %artifact.name,
            version = %artifact.version,
            kind = artifact.model.kind(),
            "Loaded model artifact"
        );
        Ok(artifact)
    }

    /// Parse and validate an artifact from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the feature contract, then the model's own structure.
    pub fn validate(&self) -> Result<(), ModelError> {
        super::check_feature_schema(&self.feature_names)?;

        match &self.model {
            ModelSpec::TreeEnsemble(ensemble) => ensemble.validate(),
            ModelSpec::Linear(linear) => linear.validate(),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            kind: self.model.kind().to_string(),
            feature_names: self.feature_names.clone(),
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(rows.len());
        for (i, features) in rows.iter().enumerate() {
            let row = features.to_row();
            let value = match &self.model {
                ModelSpec::TreeEnsemble(ensemble) => ensemble.evaluate(&row),
                ModelSpec::Linear(linear) => linear.evaluate(&row),
            };
            if !value.is_finite() {
                return Err(ModelError::NonFiniteOutput { row: i, value });
            }
            out.push(value);
        }
        debug!(rows = rows.len(), model = %self.name, "Batch inference complete");
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
