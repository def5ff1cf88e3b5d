//! Application Configuration - model location, server, input limits and batch export
//!
//! Each struct implements `Default` with the values in `defaults.rs`, so a
//! missing file or a partial file behaves exactly like the built-in setup.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::BlastObservation;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PPV_CONFIG";
/// Environment override for `model.path`.
pub const MODEL_PATH_ENV: &str = "PPV_MODEL_PATH";
/// Environment override for `server.addr`.
pub const SERVER_ADDR_ENV: &str = "PPV_SERVER_ADDR";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ppv_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a deployment.
///
/// Load with `AppConfig::load()` which searches:
/// 1. An explicit path (`--config`)
/// 2. `$PPV_CONFIG`
/// 3. `./ppv_config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Lower bounds and form defaults for single-input predictions
    #[serde(default)]
    pub input: InputLimits,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path must load; the env var and local file fall back to
    /// defaults with a warning, matching how an unconfigured host starts.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: unknown keys only warn, serde does the real parse
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PPV_MODEL_PATH` / `PPV_SERVER_ADDR` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (env in production, a map in tests).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(MODEL_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            info!(path = %path, "Model path overridden by {}", MODEL_PATH_ENV);
            self.model.path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(SERVER_ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            info!(addr = %addr, "Server address overridden by {}", SERVER_ADDR_ENV);
            self.server.addr = addr;
        }
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate every section, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.model.path.as_os_str().is_empty() {
            errors.push("model.path must not be empty".to_string());
        }

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid HOST:PORT socket address",
                self.server.addr
            ));
        }
        if self.server.max_upload_bytes == 0 {
            errors.push("server.max_upload_bytes must be > 0".to_string());
        }

        let i = &self.input;
        Self::check_positive(i.min_distance_m, "input.min_distance_m", &mut errors);
        Self::check_positive(i.min_charge_kg, "input.min_charge_kg", &mut errors);
        Self::check_at_least(i.default_distance_m, i.min_distance_m, "input.default_distance_m", &mut errors);
        Self::check_at_least(i.default_charge_kg, i.min_charge_kg, "input.default_charge_kg", &mut errors);

        let b = &self.batch;
        if b.output_column.trim().is_empty() {
            errors.push("batch.output_column must not be empty".to_string());
        }
        if b.download_filename.trim().is_empty()
            || b
                .download_filename
                .chars()
                .any(|c| matches!(c, '"' | '/' | '\\') || c.is_control())
        {
            errors.push(format!(
                "batch.download_filename = '{}' must be a plain, non-empty file name",
                b.download_filename
            ));
        }
        if b.preview_rows == 0 {
            errors.push("batch.preview_rows must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN fails the comparison, so test the positive case
        if !(value.is_finite() && value > 0.0) {
            errors.push(format!("{name} = {value} must be a finite value > 0"));
        }
    }

    fn check_at_least(value: f64, min: f64, name: &str, errors: &mut Vec<String>) {
        if !(value.is_finite() && value >= min) {
            errors.push(format!("{name} = {value} must be >= the configured minimum ({min})"));
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the JSON model artifact.
    ///
    /// Can be overridden by `PPV_MODEL_PATH` env var or `--model` CLI flag.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(defaults::MODEL_PATH)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `PPV_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Largest accepted request body for batch uploads (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

fn default_max_upload_bytes() -> usize {
    defaults::MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ============================================================================
// Input limits
// ============================================================================

/// Single-input value rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InputError {
    #[error("distance {value} m is below the minimum of {min} m")]
    DistanceTooSmall { value: f64, min: f64 },

    #[error("charge per delay {value} kg is below the minimum of {min} kg")]
    ChargeTooSmall { value: f64, min: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLimits {
    #[serde(default = "default_min_distance")]
    pub min_distance_m: f64,
    #[serde(default = "default_min_charge")]
    pub min_charge_kg: f64,
    #[serde(default = "default_distance")]
    pub default_distance_m: f64,
    #[serde(default = "default_charge")]
    pub default_charge_kg: f64,
}

fn default_min_distance() -> f64 {
    defaults::MIN_DISTANCE_M
}
fn default_min_charge() -> f64 {
    defaults::MIN_CHARGE_KG
}
fn default_distance() -> f64 {
    defaults::DEFAULT_DISTANCE_M
}
fn default_charge() -> f64 {
    defaults::DEFAULT_CHARGE_KG
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_distance_m: default_min_distance(),
            min_charge_kg: default_min_charge(),
            default_distance_m: default_distance(),
            default_charge_kg: default_charge(),
        }
    }
}

impl InputLimits {
    /// Enforce the minimum-value constraints on an operator-entered observation.
    ///
    /// NaN fails both checks.
    pub fn check(&self, obs: &BlastObservation) -> Result<(), InputError> {
        if !(obs.distance_m >= self.min_distance_m) || !obs.distance_m.is_finite() {
            return Err(InputError::DistanceTooSmall {
                value: obs.distance_m,
                min: self.min_distance_m,
            });
        }
        if !(obs.charge_kg >= self.min_charge_kg) || !obs.charge_kg.is_finite() {
            return Err(InputError::ChargeTooSmall {
                value: obs.charge_kg,
                min: self.min_charge_kg,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Batch
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Header of the appended prediction column
    #[serde(default = "default_output_column")]
    pub output_column: String,

    /// File name offered for download
    #[serde(default = "default_download_filename")]
    pub download_filename: String,

    /// Rows included in a batch preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_output_column() -> String {
    defaults::PREDICTION_COLUMN.to_string()
}

fn default_download_filename() -> String {
    defaults::DOWNLOAD_FILENAME.to_string()
}

fn default_preview_rows() -> usize {
    defaults::PREVIEW_ROWS
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_column: default_output_column(),
            download_filename: default_download_filename(),
            preview_rows: default_preview_rows(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RockType;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model.path, PathBuf::from("models/ppv_model.json"));
        assert_eq!(config.input.min_charge_kg, 1.0);
        assert_eq!(config.batch.output_column, "Predicted PPV (mm/s)");
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[server]
addr = "127.0.0.1:9090"

[input]
min_distance_m = 5.0
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.server.addr, "127.0.0.1:9090");
        assert_eq!(config.input.min_distance_m, 5.0);
        // Non-overridden values retain defaults
        assert_eq!(config.input.min_charge_kg, 1.0);
        assert_eq!(config.server.max_upload_bytes, defaults::MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.addr = "not-an-addr".to_string();
        config.input.min_charge_kg = 0.0;
        config.batch.download_filename = "../evil\".csv".to_string();

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 3, "got: {errors:?}");
                assert!(errors.iter().any(|e| e.contains("server.addr")));
                assert!(errors.iter().any(|e| e.contains("min_charge_kg")));
                assert!(errors.iter().any(|e| e.contains("download_filename")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_default_below_minimum() {
        let mut config = AppConfig::default();
        config.input.min_distance_m = 200.0;
        let result = config.validate();
        assert!(result.is_err(), "Default distance below the minimum should fail");
    }

    #[test]
    fn test_overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            (MODEL_PATH_ENV, "/opt/models/alt.json"),
            (SERVER_ADDR_ENV, "127.0.0.1:7000"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.model.path, PathBuf::from("/opt/models/alt.json"));
        assert_eq!(config.server.addr, "127.0.0.1:7000");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(|_| Some("   ".to_string()));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_input_limits() {
        let limits = InputLimits::default();
        assert!(limits.check(&BlastObservation::new(1.0, 1.0, RockType::Coal)).is_ok());
        assert!(matches!(
            limits.check(&BlastObservation::new(0.5, 10.0, RockType::Coal)),
            Err(InputError::DistanceTooSmall { .. })
        ));
        assert!(matches!(
            limits.check(&BlastObservation::new(10.0, 0.0, RockType::Coal)),
            Err(InputError::ChargeTooSmall { .. })
        ));
        assert!(limits
            .check(&BlastObservation::new(f64::NAN, 10.0, RockType::Coal))
            .is_err());
        assert!(limits
            .check(&BlastObservation::new(10.0, f64::INFINITY, RockType::Coal))
            .is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = AppConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: AppConfig = toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
    }
}
