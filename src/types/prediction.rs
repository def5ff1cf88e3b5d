//! Prediction output types: SafetyLabel, PredictionResult

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-tier ordinal safety zone derived from PPV.
///
/// Ordering follows severity: `Safe < Moderate < Dangerous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafetyLabel {
    Safe,
    Moderate,
    Dangerous,
}

impl SafetyLabel {
    /// Operator-facing message shown next to the predicted value.
    pub fn message(self) -> &'static str {
        match self {
            SafetyLabel::Safe => "Safe Zone (PPV < 5 mm/s)",
            SafetyLabel::Moderate => "Moderate Risk (5 ≤ PPV ≤ 10 mm/s)",
            SafetyLabel::Dangerous => "Danger Zone (PPV > 10 mm/s)",
        }
    }

    pub fn short_code(self) -> &'static str {
        match self {
            SafetyLabel::Safe => "SAFE",
            SafetyLabel::Moderate => "MODERATE",
            SafetyLabel::Dangerous => "DANGER",
        }
    }
}

impl fmt::Display for SafetyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyLabel::Safe => write!(f, "Safe"),
            SafetyLabel::Moderate => write!(f, "Moderate"),
            SafetyLabel::Dangerous => write!(f, "Dangerous"),
        }
    }
}

/// Rounded PPV plus its safety zone. Never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted peak particle velocity (mm/s), rounded to 3 decimals
    pub ppv_mm_s: f64,
    pub safety: SafetyLabel,
}
