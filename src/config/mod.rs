//! Application Configuration Module
//!
//! Deployment configuration loaded from TOML, covering the model artifact
//! location, the HTTP server, single-input limits and batch export naming.
//!
//! ## Loading Order
//!
//! 1. `--config <PATH>` CLI flag
//! 2. `PPV_CONFIG` environment variable (path to TOML file)
//! 3. `ppv_config.toml` in the current working directory
//! 4. Built-in defaults (`defaults.rs`)
//!
//! `PPV_MODEL_PATH` and `PPV_SERVER_ADDR` then override the loaded values,
//! and CLI flags override those.
//!
//! ## Usage
//!
//! The config is a plain value built once in `main()` and handed to the
//! components that need it:
//!
//! ```ignore
//! let mut config = AppConfig::load(args.config.as_deref())?;
//! config.apply_env_overrides();
//! let state = ApiState::new(predictor, artifact.info(), config);
//! ```

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;
