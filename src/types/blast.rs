//! Blast observation types: RockType, BlastObservation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rock type string that is neither coal nor limestone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown rock type '{0}' (expected 'Coal' or 'Limestone')")]
pub struct UnknownRockType(pub String);

/// Rock formation at the blast site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RockType {
    Coal,
    Limestone,
}

impl RockType {
    /// All selectable rock types, in display order.
    pub const ALL: [RockType; 2] = [RockType::Coal, RockType::Limestone];

    /// Ordinal encoding the bundled model was trained on (Coal = 0, Limestone = 1).
    pub fn encoding(self) -> f64 {
        match self {
            RockType::Coal => 0.0,
            RockType::Limestone => 1.0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RockType::Coal => "Coal",
            RockType::Limestone => "Limestone",
        }
    }
}

impl fmt::Display for RockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RockType {
    type Err = UnknownRockType;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coal" => Ok(RockType::Coal),
            "limestone" => Ok(RockType::Limestone),
            _ => Err(UnknownRockType(s.to_string())),
        }
    }
}

impl TryFrom<String> for RockType {
    type Error = UnknownRockType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RockType> for String {
    fn from(rock: RockType) -> Self {
        rock.display_name().to_string()
    }
}

/// One blast as entered by the operator (or read from a batch row).
///
/// Units: distance in metres from blast point to sensor, charge in kg per delay.
/// Lower bounds are enforced at the input boundary (`config::InputLimits`),
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlastObservation {
    pub distance_m: f64,
    pub charge_kg: f64,
    pub rock_type: RockType,
}

impl BlastObservation {
    pub fn new(distance_m: f64, charge_kg: f64, rock_type: RockType) -> Self {
        Self {
            distance_m,
            charge_kg,
            rock_type,
        }
    }
}
