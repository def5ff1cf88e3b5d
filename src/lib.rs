//! PPV Predictor: blast-induced ground vibration prediction
//!
//! Predicts Peak Particle Velocity (PPV, mm/s) from blast distance, charge
//! per delay and rock type, and classifies the result into a safety zone.
//!
//! ## Architecture
//!
//! - **Feature Deriver** (`features`): raw inputs → seven-column feature row
//! - **Model Predictor** (`model`): pre-trained regressor loaded from a JSON artifact
//! - **Safety Classifier** (`safety`): PPV → Safe / Moderate / Dangerous
//! - **Predictor** (`predictor`): the three steps composed, model injected
//! - **Batch Mode** (`batch`): the same pipeline over a CSV table
//! - **API** (`api`): axum router for single and batch predictions

pub mod api;
pub mod batch;
pub mod config;
pub mod features;
pub mod model;
pub mod predictor;
pub mod safety;
pub mod types;

// Re-export configuration
pub use config::AppConfig;

// Re-export commonly used types
pub use types::{BlastObservation, PredictionResult, RockType, SafetyLabel};

// Re-export pipeline components
pub use features::{FeatureVector, FEATURE_COLUMNS};
pub use model::{ModelArtifact, Regressor};
pub use predictor::{PpvPredictor, Prediction};
