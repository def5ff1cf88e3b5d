//! Batch Mode
//!
//! Applies the single-prediction pipeline to every row of an uploaded CSV
//! table and appends one prediction column. Original columns, values and
//! row order are preserved; nothing is carried over between uploads.
//!
//! ## Error handling
//!
//! - Missing required columns → [`BatchError::MissingColumns`], no output
//! - Unparseable CSV, bad values, unknown rock types, model failures →
//!   the matching [`BatchError`] variant, no output
//!
//! Unknown rock types reject the whole batch rather than scoring the row
//! with an undefined encoding.

mod columns;
mod scoring;

pub use columns::{ColumnMapping, ColumnRole, MatchedColumn, MissingColumns};
pub use scoring::{preview_csv, score_csv, BatchPreview, BatchSummary, PreviewRow, ScoredBatch};

use thiserror::Error;

use crate::config::{defaults, BatchConfig};
use crate::predictor::PredictError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    MissingColumns(#[from] MissingColumns),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// `row` is 1-based and excludes the header line
    #[error("Row {row}, column '{column}': {reason}")]
    InvalidRow {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Prediction failed: {0}")]
    Predict(#[from] PredictError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Output naming and preview size for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub output_column: String,
    pub preview_rows: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_column: defaults::PREDICTION_COLUMN.to_string(),
            preview_rows: defaults::PREVIEW_ROWS,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            output_column: config.output_column.clone(),
            preview_rows: config.preview_rows,
        }
    }
}
