//! Model Predictor
//!
//! Wraps a single externally-trained regression artifact behind the
//! [`Regressor`] trait. The artifact is loaded once at startup, validated
//! against the feature deriver's column contract, and then shared read-only
//! (`Arc<dyn Regressor>`) by every request.
//!
//! ## Artifact families
//!
//! - **Tree ensemble**: gradient-boosted regression trees (XGBoost-style
//!   node arrays, `x < threshold` goes left)
//! - **Linear**: intercept plus one coefficient per feature column

mod artifact;
mod linear;
mod tree;

pub use artifact::{ModelArtifact, ModelInfo, ModelSpec};
pub use linear::LinearModel;
pub use tree::{RegressionTree, TreeEnsemble, TreeNode};

use std::path::PathBuf;
use thiserror::Error;

use crate::features::{FeatureVector, FEATURE_COLUMNS};

/// Model loading and inference errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact was trained on a different column set or order
    #[error("Feature schema mismatch: artifact expects {found:?}, deriver produces {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid model structure: {0}")]
    InvalidStructure(String),

    #[error("Model produced a non-finite prediction ({value}) for row {row}")]
    NonFiniteOutput { row: usize, value: f64 },
}

/// A pre-trained regressor invoked as a pure function.
pub trait Regressor: Send + Sync {
    /// Predict one value per feature row, in input order, in a single call.
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError>;

    /// Predict a single row.
    fn predict(&self, row: &FeatureVector) -> Result<f64, ModelError> {
        let values = self.predict_batch(std::slice::from_ref(row))?;
        values
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidStructure("model returned no prediction".to_string()))
    }

    /// Human-readable model name for logs and the API.
    fn name(&self) -> &str;

    /// Column names the model was trained on, in order.
    fn feature_names(&self) -> &[String];
}

/// Require `found` to be exactly `FEATURE_COLUMNS`, in order.
pub fn check_feature_schema(found: &[String]) -> Result<(), ModelError> {
    let matches = found.len() == FEATURE_COLUMNS.len()
        && found
            .iter()
            .zip(FEATURE_COLUMNS.iter())
            .all(|(found, expected)| found == expected);
    if matches {
        Ok(())
    } else {
        Err(ModelError::SchemaMismatch {
            expected: FEATURE_COLUMNS.iter().map(|s| (*s).to_string()).collect(),
            found: found.to_vec(),
        })
    }
}
