//! Pipeline Integration Tests
//!
//! Runs the shipped demonstration model (models/ppv_model.json) through the
//! full derive → predict → classify pipeline and through batch scoring.

use ppv_predictor::batch::{self, BatchError, BatchOptions, ColumnRole};
use ppv_predictor::model::{ModelArtifact, ModelError};
use ppv_predictor::{BlastObservation, PpvPredictor, RockType, SafetyLabel, FEATURE_COLUMNS};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn shipped_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/ppv_model.json")
}

fn shipped_predictor() -> PpvPredictor {
    let artifact = ModelArtifact::load(&shipped_model_path()).expect("shipped model should load");
    PpvPredictor::new(Arc::new(artifact)).expect("shipped model matches the deriver")
}

// ============================================================================
// Model artifact
// ============================================================================

#[test]
fn shipped_model_matches_feature_schema() {
    let artifact = assert_ok!(ModelArtifact::load(&shipped_model_path()));
    let info = artifact.info();
    assert_eq!(info.kind, "tree_ensemble");
    assert_eq!(info.feature_names, FEATURE_COLUMNS.map(String::from).to_vec());
}

#[test]
fn missing_model_file_is_an_io_error() {
    let err = assert_err!(ModelArtifact::load(&PathBuf::from("models/does_not_exist.json")));
    assert!(matches!(err, ModelError::Io { .. }));
}

// ============================================================================
// Single predictions
// ============================================================================

#[test]
fn default_form_inputs_are_moderate() {
    // 100 m, 50 kg, coal: scaled distance ≈ 14.14
    let predictor = shipped_predictor();
    let p = assert_ok!(predictor.predict(&BlastObservation::new(100.0, 50.0, RockType::Coal)));

    assert!((p.features.scaled_distance - 100.0 / 50.0_f64.sqrt()).abs() < 1e-12);
    assert_eq!(p.features.distance_x_charge, 5000.0);
    assert_eq!(p.features.distance_squared, 10_000.0);
    assert_eq!(p.features.charge_squared, 2500.0);
    assert_eq!(p.features.rock, 0.0);

    assert_eq!(p.result.ppv_mm_s, 8.0);
    assert_eq!(p.result.safety, SafetyLabel::Moderate);
}

#[test]
fn close_heavy_blast_is_dangerous() {
    let predictor = shipped_predictor();
    let p = predictor
        .predict(&BlastObservation::new(10.0, 100.0, RockType::Coal))
        .unwrap();
    assert_eq!(p.result.ppv_mm_s, 28.5);
    assert_eq!(p.result.safety, SafetyLabel::Dangerous);
}

#[test]
fn distant_light_blast_is_safe() {
    let predictor = shipped_predictor();
    let p = predictor
        .predict(&BlastObservation::new(500.0, 10.0, RockType::Limestone))
        .unwrap();
    assert_eq!(p.result.ppv_mm_s, 0.9);
    assert_eq!(p.result.safety, SafetyLabel::Safe);
}

#[test]
fn rock_type_changes_the_prediction() {
    let predictor = shipped_predictor();
    let coal = predictor
        .predict(&BlastObservation::new(100.0, 50.0, RockType::Coal))
        .unwrap();
    let lime = predictor
        .predict(&BlastObservation::new(100.0, 50.0, RockType::Limestone))
        .unwrap();
    assert_eq!(coal.features.distance_x_charge, lime.features.distance_x_charge);
    assert_ne!(coal.result.ppv_mm_s, lime.result.ppv_mm_s);
}

#[test]
fn zero_charge_is_rejected_before_the_model() {
    let predictor = shipped_predictor();
    assert_err!(predictor.predict(&BlastObservation::new(100.0, 0.0, RockType::Coal)));
}

// ============================================================================
// Batch scoring
// ============================================================================

const SITE_LOG: &str = "\
Shot ID,Distance to Sensor (m),Charge per Delay (kg),Rock Type,Operator
S-01,100,50,Coal,J. Smith
S-02,10,100,coal,\"Lee, K.\"
S-03,500,10,Limestone,
";

#[test]
fn batch_preserves_rows_and_appends_predictions() {
    let predictor = shipped_predictor();
    let mut out = Vec::new();
    let summary = assert_ok!(batch::score_csv(
        &predictor,
        SITE_LOG.as_bytes(),
        &mut out,
        &BatchOptions::default()
    ));

    assert_eq!(summary.rows, 3);
    assert_eq!((summary.safe, summary.moderate, summary.dangerous), (1, 1, 1));
    assert_eq!(summary.columns.charge.header, "Charge per Delay (kg)");

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Shot ID,Distance to Sensor (m),Charge per Delay (kg),Rock Type,Operator,Predicted PPV (mm/s)"
    );
    assert_eq!(lines[1], "S-01,100,50,Coal,J. Smith,8.000");
    assert_eq!(lines[2], "S-02,10,100,coal,\"Lee, K.\",28.500");
    assert_eq!(lines[3], "S-03,500,10,Limestone,,0.900");
    assert_eq!(lines.len(), 4);
}

#[test]
fn batch_matches_single_predictions() {
    let predictor = shipped_predictor();
    let scored = batch::ScoredBatch::score(&predictor, SITE_LOG.as_bytes()).unwrap();
    let single = predictor
        .predict(&BlastObservation::new(10.0, 100.0, RockType::Coal))
        .unwrap();
    assert_eq!(scored.predictions()[1].result, single.result);
}

#[test]
fn batch_missing_charge_column_names_it() {
    let predictor = shipped_predictor();
    let csv = "distance,rock type\n100,coal\n";
    let mut out = Vec::new();
    let err = batch::score_csv(&predictor, csv.as_bytes(), &mut out, &BatchOptions::default())
        .unwrap_err();

    match err {
        BatchError::MissingColumns(m) => assert_eq!(m.missing, vec![ColumnRole::Charge]),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    assert!(out.is_empty(), "nothing is written for a failed batch");
}

#[test]
fn batch_unknown_rock_fails_whole_table() {
    let predictor = shipped_predictor();
    let csv = "distance,charge,rock type\n100,50,coal\n80,40,granite\n";
    let mut out = Vec::new();
    let err = batch::score_csv(&predictor, csv.as_bytes(), &mut out, &BatchOptions::default())
        .unwrap_err();

    match err {
        BatchError::InvalidRow { row, column, .. } => {
            assert_eq!(row, 2);
            assert_eq!(column, "rock type");
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn batch_to_file_on_disk() {
    let predictor = shipped_predictor();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scored.csv");

    let file = std::fs::File::create(&path).unwrap();
    batch::score_csv(&predictor, SITE_LOG.as_bytes(), file, &BatchOptions::default()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(written.lines().all(|l| !l.is_empty()));
}
