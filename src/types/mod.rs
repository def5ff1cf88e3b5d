//! Shared data structures for the PPV prediction pipeline
//!
//! This module defines the core types that flow through the pipeline:
//! - Stage 1: BlastObservation (raw operator input)
//! - Stage 2: FeatureVector (see `features`)
//! - Stage 3: PredictionResult + SafetyLabel (model output and safety zone)

mod blast;
mod prediction;
// Public so callers can reach the constants as `types::thresholds::*`.
pub mod thresholds;

pub use blast::*;
pub use prediction::*;
