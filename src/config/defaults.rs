//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery. Every value here can be
//! overridden from `ppv_config.toml` unless noted otherwise.

// ============================================================================
// Model
// ============================================================================

/// Model artifact path, relative to the working directory.
pub const MODEL_PATH: &str = "models/ppv_model.json";

// ============================================================================
// Server
// ============================================================================

/// HTTP server bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

/// Largest accepted batch upload (bytes). 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// Input boundary
// ============================================================================

/// Smallest distance accepted from an operator (m).
pub const MIN_DISTANCE_M: f64 = 1.0;

/// Smallest charge per delay accepted from an operator (kg).
pub const MIN_CHARGE_KG: f64 = 1.0;

/// Pre-filled distance in the input form (m).
pub const DEFAULT_DISTANCE_M: f64 = 100.0;

/// Pre-filled charge per delay in the input form (kg).
pub const DEFAULT_CHARGE_KG: f64 = 50.0;

// ============================================================================
// Batch
// ============================================================================

/// Header of the column appended to every scored table.
pub const PREDICTION_COLUMN: &str = "Predicted PPV (mm/s)";

/// File name offered for the annotated table download.
pub const DOWNLOAD_FILENAME: &str = "ppv_predictions.csv";

/// Rows returned by the batch preview endpoint.
pub const PREVIEW_ROWS: usize = 20;
