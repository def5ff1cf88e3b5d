//! Batch CSV handlers: annotated download and on-screen preview

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::ApiState;
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::batch::{BatchError, BatchOptions, ScoredBatch};

/// Header carrying the number of scored rows on a download.
const BATCH_ROWS_HEADER: HeaderName = HeaderName::from_static("x-batch-rows");

/// Map a batch failure onto the error envelope.
///
/// Missing columns get their own code; everything else is reported with
/// the underlying error text.
fn batch_error_response(err: &BatchError) -> Response {
    warn!(error = %err, "Batch upload rejected");
    match err {
        BatchError::MissingColumns(m) => ApiErrorResponse::missing_columns(m.to_string()),
        other => ApiErrorResponse::batch_failed(format!("Error processing file: {other}")),
    }
}

/// POST /api/v2/batch
///
/// Body: CSV table. Returns the table with the prediction column appended
/// as a `text/csv` attachment.
pub async fn batch_download(State(state): State<ApiState>, body: Bytes) -> Response {
    let options = BatchOptions::from(&state.config.batch);

    let scored = match ScoredBatch::score(&state.predictor, body.as_ref()) {
        Ok(s) => s,
        Err(e) => return batch_error_response(&e),
    };
    let csv = match scored.to_csv(&options.output_column) {
        Ok(bytes) => bytes,
        Err(e) => return ApiErrorResponse::internal(format!("Failed to encode CSV: {e}")),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.config.batch.download_filename
    );
    let Ok(disposition) = HeaderValue::from_str(&disposition) else {
        return ApiErrorResponse::internal("download file name is not a valid header value");
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
            (BATCH_ROWS_HEADER, HeaderValue::from(scored.summary().rows)),
        ],
        csv,
    )
        .into_response()
}

/// POST /api/v2/batch/preview
///
/// Body: CSV table. Returns the first rows with their safety zones plus totals.
pub async fn batch_preview(State(state): State<ApiState>, body: Bytes) -> Response {
    let options = BatchOptions::from(&state.config.batch);
    match ScoredBatch::score(&state.predictor, body.as_ref()) {
        Ok(scored) => ApiResponse::ok(scored.preview(options.preview_rows)),
        Err(e) => batch_error_response(&e),
    }
}
