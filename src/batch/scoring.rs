//! Batch scoring of CSV tables
//!
//! Reads the whole upload, parses every row, predicts with a single bulk
//! model call, and only then writes the annotated table. A failure at any
//! step leaves the output untouched. The annotated table keeps the input's
//! line endings and leading byte-order mark.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;
use std::io::{Read, Write};
use tracing::{debug, info};

use super::{BatchError, BatchOptions, ColumnMapping, ColumnRole};
use crate::predictor::{PpvPredictor, Prediction};
use crate::types::{BlastObservation, RockType, SafetyLabel};

/// Per-upload totals, returned to logs and the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub safe: usize,
    pub moderate: usize,
    pub dangerous: usize,
    pub columns: ColumnMapping,
}

/// One annotated row for on-screen display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub distance_m: f64,
    pub charge_kg: f64,
    pub rock_type: RockType,
    pub ppv_mm_s: f64,
    pub safety: SafetyLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPreview {
    pub summary: BatchSummary,
    pub rows: Vec<PreviewRow>,
    /// True when the table has more rows than the preview shows
    pub truncated: bool,
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Byte-level layout of the uploaded table, reproduced on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextLayout {
    bom: bool,
    crlf: bool,
}

impl TextLayout {
    /// Line ending is taken from the first line.
    fn sniff(raw: &[u8]) -> Self {
        let crlf = raw
            .iter()
            .position(|&b| b == b'\n')
            .is_some_and(|i| i > 0 && raw[i - 1] == b'\r');
        Self {
            bom: raw.starts_with(UTF8_BOM),
            crlf,
        }
    }

    fn terminator(self) -> Terminator {
        if self.crlf {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        }
    }
}

/// A fully scored table held in memory until it is written.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    layout: TextLayout,
    headers: StringRecord,
    records: Vec<StringRecord>,
    observations: Vec<BlastObservation>,
    predictions: Vec<Prediction>,
    summary: BatchSummary,
}

impl ScoredBatch {
    /// Read and score a CSV table.
    pub fn score<R: Read>(predictor: &PpvPredictor, mut input: R) -> Result<Self, BatchError> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;
        let layout = TextLayout::sniff(&raw);

        // The reader strips a leading BOM from the header row
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(raw.as_slice());
        let headers = reader.headers()?.clone();
        let header_names: Vec<&str> = headers.iter().collect();
        let columns = ColumnMapping::discover(&header_names)?;
        debug!(
            distance = %columns.distance.header,
            charge = %columns.charge.header,
            rock_type = %columns.rock_type.header,
            "Batch columns discovered"
        );

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        let observations = records
            .iter()
            .enumerate()
            .map(|(i, record)| parse_row(&columns, record, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let predictions = predictor.predict_all(&observations)?;

        let mut summary = BatchSummary {
            rows: predictions.len(),
            safe: 0,
            moderate: 0,
            dangerous: 0,
            columns,
        };
        for p in &predictions {
            match p.result.safety {
                SafetyLabel::Safe => summary.safe += 1,
                SafetyLabel::Moderate => summary.moderate += 1,
                SafetyLabel::Dangerous => summary.dangerous += 1,
            }
        }

        info!(
            rows = summary.rows,
            safe = summary.safe,
            moderate = summary.moderate,
            dangerous = summary.dangerous,
            "Batch scored"
        );

        Ok(Self {
            layout,
            headers,
            records,
            observations,
            predictions,
            summary,
        })
    }

    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Render the original table plus the prediction column as CSV bytes.
    pub fn to_csv(&self, output_column: &str) -> Result<Vec<u8>, BatchError> {
        let mut out = Vec::new();
        if self.layout.bom {
            out.extend_from_slice(UTF8_BOM);
        }
        let mut writer = WriterBuilder::new()
            .terminator(self.layout.terminator())
            .from_writer(out);

        let mut header = self.headers.clone();
        header.push_field(output_column);
        writer.write_record(&header)?;

        for (record, prediction) in self.records.iter().zip(&self.predictions) {
            let mut row = record.clone();
            row.push_field(&format!("{:.3}", prediction.result.ppv_mm_s));
            writer.write_record(&row)?;
        }

        writer.into_inner().map_err(|e| BatchError::Io(e.into_error()))
    }

    /// First `limit` annotated rows for display.
    pub fn preview(&self, limit: usize) -> BatchPreview {
        let rows = self
            .observations
            .iter()
            .zip(&self.predictions)
            .take(limit)
            .enumerate()
            .map(|(i, (obs, p))| PreviewRow {
                row: i + 1,
                distance_m: obs.distance_m,
                charge_kg: obs.charge_kg,
                rock_type: obs.rock_type,
                ppv_mm_s: p.result.ppv_mm_s,
                safety: p.result.safety,
            })
            .collect();

        BatchPreview {
            summary: self.summary.clone(),
            rows,
            truncated: self.predictions.len() > limit,
        }
    }
}

/// Parse one data row. `row` is 1-based and excludes the header.
fn parse_row(
    columns: &ColumnMapping,
    record: &StringRecord,
    row: usize,
) -> Result<BlastObservation, BatchError> {
    let field = |role: ColumnRole| {
        let col = columns.column(role);
        record.get(col.index).ok_or_else(|| BatchError::InvalidRow {
            row,
            column: col.header.clone(),
            reason: "value is missing".to_string(),
        })
    };

    let positive = |role: ColumnRole| -> Result<f64, BatchError> {
        let raw = field(role)?;
        let invalid = |reason: String| BatchError::InvalidRow {
            row,
            column: columns.column(role).header.clone(),
            reason,
        };
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(format!("{value} must be a positive number")));
        }
        Ok(value)
    };

    let distance_m = positive(ColumnRole::Distance)?;
    let charge_kg = positive(ColumnRole::Charge)?;
    let rock_type = field(ColumnRole::RockType)?
        .parse::<RockType>()
        .map_err(|e| BatchError::InvalidRow {
            row,
            column: columns.rock_type.header.clone(),
            reason: e.to_string(),
        })?;

    Ok(BlastObservation::new(distance_m, charge_kg, rock_type))
}

/// Score `input` and write the annotated table to `output`.
///
/// Nothing is written unless every row scores successfully.
pub fn score_csv<R: Read, W: Write>(
    predictor: &PpvPredictor,
    input: R,
    mut output: W,
    options: &BatchOptions,
) -> Result<BatchSummary, BatchError> {
    let scored = ScoredBatch::score(predictor, input)?;
    let bytes = scored.to_csv(&options.output_column)?;
    output.write_all(&bytes)?;
    output.flush()?;
    Ok(scored.summary)
}

/// Score `input` and return the first `options.preview_rows` rows.
pub fn preview_csv<R: Read>(
    predictor: &PpvPredictor,
    input: R,
    options: &BatchOptions,
) -> Result<BatchPreview, BatchError> {
    Ok(ScoredBatch::score(predictor, input)?.preview(options.preview_rows))
}
