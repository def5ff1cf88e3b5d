//! Config Validation Tests
//!
//! Exercises TOML loading, typo detection and range validation
//! independently from the prediction pipeline.

use ppv_predictor::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use ppv_predictor::config::{AppConfig, ConfigError};
use std::collections::HashMap;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_model_section_warns_with_suggestion() {
    let toml_str = r#"
[model]
pth = "models/other.json"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("pth"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("model.path"));
}

#[test]
fn typo_in_batch_section_warns() {
    let toml_str = r#"
[batch]
preview_row = 5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("batch.preview_rows"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[model]
path = "models/ppv_model.json"

[server]
addr = "127.0.0.1:9090"
max_upload_bytes = 1048576

[input]
min_distance_m = 1.0
min_charge_kg = 1.0
default_distance_m = 100.0
default_charge_kg = 50.0

[batch]
output_column = "Predicted PPV (mm/s)"
download_filename = "ppv_predictions.csv"
preview_rows = 20
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let toml_str = r#"
[telemetry]
endpoint = "http://localhost"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn suggestion_picks_nearest_known_key() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("server.adr", &known).as_deref(),
        Some("server.addr")
    );
    assert_eq!(suggest_correction("completely.different", &known), None);
}

// ============================================================================
// Loading From Disk
// ============================================================================

#[test]
fn partial_file_fills_defaults() {
    let file = write_config(
        r#"
[server]
addr = "127.0.0.1:9999"
"#,
    );
    let config = AppConfig::load_from_file(file.path()).expect("config should load");
    assert_eq!(config.server.addr, "127.0.0.1:9999");
    assert_eq!(config.batch.output_column, "Predicted PPV (mm/s)");
    assert_eq!(config.input.default_distance_m, 100.0);
}

#[test]
fn explicit_path_must_exist() {
    let err = AppConfig::load(Some(std::path::Path::new("/nonexistent/ppv_config.toml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[server\naddr = ");
    let err = AppConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

#[test]
fn out_of_range_values_are_all_reported() {
    let file = write_config(
        r#"
[server]
addr = "not-an-address"

[input]
min_charge_kg = 0.0

[batch]
preview_rows = 0
"#,
    );
    match AppConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 3, "errors: {errors:?}");
            assert!(errors.iter().any(|e| e.contains("server.addr")));
            assert!(errors.iter().any(|e| e.contains("input.min_charge_kg")));
            assert!(errors.iter().any(|e| e.contains("batch.preview_rows")));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn env_overrides_replace_file_values() {
    let mut config = AppConfig::default();
    let env: HashMap<&str, &str> = HashMap::from([
        ("PPV_MODEL_PATH", "/srv/models/site.json"),
        ("PPV_SERVER_ADDR", "127.0.0.1:7000"),
    ]);
    config.apply_overrides_from(|key| env.get(key).map(|v| (*v).to_string()));

    assert_eq!(config.model.path, std::path::PathBuf::from("/srv/models/site.json"));
    assert_eq!(config.server.addr, "127.0.0.1:7000");
    assert!(config.validate().is_ok());
}

#[test]
fn serialized_config_round_trips_through_disk() {
    let original = AppConfig::default();
    let file = write_config(&original.to_toml().unwrap());
    let reloaded = AppConfig::load_from_file(file.path()).unwrap();
    assert_eq!(reloaded.server.addr, original.server.addr);
    assert_eq!(reloaded.batch.download_filename, original.batch.download_filename);
}
