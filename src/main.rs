//! PPV Predictor - blast vibration prediction service and CLI
//!
//! Predicts Peak Particle Velocity from blast distance, charge per delay and
//! rock type, and labels the result Safe / Moderate / Dangerous.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API (default)
//! cargo run --release
//!
//! # One prediction from the command line
//! ./ppv-predictor predict --distance 100 --charge 50 --rock coal
//!
//! # Score a CSV table
//! ./ppv-predictor batch --input blasts.csv --output scored.csv
//! ```
//!
//! # Environment Variables
//!
//! - `PPV_CONFIG`: Path to the TOML config (default: ./ppv_config.toml)
//! - `PPV_MODEL_PATH`: Model artifact path (default: models/ppv_model.json)
//! - `PPV_SERVER_ADDR`: HTTP bind address (default: 0.0.0.0:8080)
//! - `PPV_CORS_ORIGINS`: Comma-separated allowed origins
//! - `PPV_LOG_JSON`: Set to `true` for JSON log lines
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ppv_predictor::api::{create_app, ApiState};
use ppv_predictor::batch::{self, BatchOptions};
use ppv_predictor::config::AppConfig;
use ppv_predictor::model::ModelArtifact;
use ppv_predictor::{BlastObservation, PpvPredictor, RockType};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ppv-predictor")]
#[command(about = "Blast-induced PPV prediction and safety-zone classification")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides PPV_CONFIG and ./ppv_config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to the model artifact (overrides config and PPV_MODEL_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true, env = "PPV_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API (default when no subcommand is given)
    Serve {
        /// Override the server address (e.g. "127.0.0.1:8080")
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Predict PPV for a single blast
    Predict {
        /// Distance from blast point to sensor (m)
        #[arg(long)]
        distance: f64,
        /// Explosive charge per delay (kg)
        #[arg(long)]
        charge: f64,
        /// Rock type: coal or limestone (case-insensitive)
        #[arg(long)]
        rock: RockType,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score every row of a CSV table and write the annotated table
    Batch {
        /// Input CSV with distance, charge and rock type columns
        #[arg(long, short)]
        input: PathBuf,
        /// Output CSV (default: the configured download file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// Startup
// ============================================================================

/// Resolve config from file, environment and CLI flags, in that order.
fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env_overrides();
    if let Some(model) = &args.model {
        config.model.path.clone_from(model);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Load the model artifact once; it is shared read-only from here on.
fn load_model(path: &Path) -> Result<ModelArtifact> {
    ModelArtifact::load(path).with_context(|| format!("Failed to load model artifact {}", path.display()))
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_server(config: AppConfig, artifact: ModelArtifact, addr_override: Option<String>) -> Result<()> {
    let addr = addr_override.unwrap_or_else(|| config.server.addr.clone());
    let info = artifact.info();
    let state = ApiState::new(PpvPredictor::new(Arc::new(artifact))?, info, config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🌐 Listening on http://{}", addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("[HttpServer] Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("[HttpServer] Server error: {}", e);
            Err(anyhow::anyhow!("HTTP server error: {}", e))
        }
    }
}

fn run_predict(config: &AppConfig, artifact: ModelArtifact, obs: BlastObservation, json: bool) -> Result<()> {
    config.input.check(&obs)?;
    let predictor = PpvPredictor::new(Arc::new(artifact))?;
    let prediction = predictor.predict(&obs)?;
    let result = prediction.result;

    if json {
        let out = serde_json::json!({
            "observation": obs,
            "features": prediction.features,
            "ppv_mm_s": result.ppv_mm_s,
            "safety": result.safety,
            "message": result.safety.message(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Predicted PPV: {:.3} mm/s", result.ppv_mm_s);
        println!("{}", result.safety.message());
    }
    Ok(())
}

fn run_batch(config: &AppConfig, artifact: ModelArtifact, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(&config.batch.download_filename));
    let predictor = PpvPredictor::new(Arc::new(artifact))?;
    let options = BatchOptions::from(&config.batch);

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?,
    );
    // Score into memory first so a failed batch never creates the output file
    let scored = batch::ScoredBatch::score(&predictor, reader)
        .with_context(|| format!("Error processing file {}", input.display()))?;
    let bytes = scored.to_csv(&options.output_column)?;

    let mut writer = BufWriter::new(
        File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    std::io::Write::write_all(&mut writer, &bytes)?;
    std::io::Write::flush(&mut writer)?;

    let summary = scored.summary();
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = summary.rows,
        "Batch written"
    );
    println!(
        "Scored {} rows → {} (safe: {}, moderate: {}, dangerous: {})",
        summary.rows,
        output.display(),
        summary.safe,
        summary.moderate,
        summary.dangerous
    );
    Ok(())
}

/// Logs go to stderr so `predict --json` output stays machine-readable.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;
    let artifact = load_model(&config.model.path)?;

    match args.command {
        None => {
            info!("PPV Predictor v{} | model: {}", env!("CARGO_PKG_VERSION"), artifact.name);
            run_server(config, artifact, None).await?;
        }
        Some(SubCommand::Serve { addr }) => {
            info!("PPV Predictor v{} | model: {}", env!("CARGO_PKG_VERSION"), artifact.name);
            run_server(config, artifact, addr).await?;
        }
        Some(SubCommand::Predict {
            distance,
            charge,
            rock,
            json,
        }) => {
            run_predict(&config, artifact, BlastObservation::new(distance, charge, rock), json)?;
        }
        Some(SubCommand::Batch { input, output }) => {
            run_batch(&config, artifact, &input, output)?;
        }
    }

    Ok(())
}
