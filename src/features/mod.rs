//! Feature derivation for the PPV regressor
//!
//! Expands a raw `BlastObservation` into the fixed seven-column feature row
//! the bundled model was trained on:
//!
//! | # | column              | formula                     |
//! |---|---------------------|-----------------------------|
//! | 0 | `distance`          | D                           |
//! | 1 | `charge`            | Q                           |
//! | 2 | `scaled_distance`   | D / √Q                      |
//! | 3 | `rock`              | Coal = 0, Limestone = 1     |
//! | 4 | `distance_x_charge` | D × Q                       |
//! | 5 | `distance_squared`  | D²                          |
//! | 6 | `charge_squared`    | Q²                          |
//!
//! Where D = distance from blast (m) and Q = charge per delay (kg).
//!
//! Only the ordinal rock encoding is produced. A model trained on a one-hot
//! rock schema has different column names and is rejected at artifact load
//! (see `model::ModelArtifact`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BlastObservation;

/// Number of columns in a feature row.
pub const FEATURE_COUNT: usize = 7;

/// Column names in the exact order the model consumes them.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "distance",
    "charge",
    "scaled_distance",
    "rock",
    "distance_x_charge",
    "distance_squared",
    "charge_squared",
];

/// Inputs the deriver refuses to expand.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FeatureError {
    /// Charge ≤ 0 (or non-finite) would make the scaled distance undefined
    #[error("charge per delay must be a finite value > 0 kg (got {0})")]
    NonPositiveCharge(f64),

    #[error("distance must be a finite value > 0 m (got {0})")]
    NonPositiveDistance(f64),

    /// Valid inputs whose derived value overflowed
    #[error("derived feature '{column}' is not finite; distance or charge is out of range")]
    NonFiniteFeature { column: &'static str },
}

/// Deterministic expansion of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub distance: f64,
    pub charge: f64,
    pub scaled_distance: f64,
    pub distance_x_charge: f64,
    pub distance_squared: f64,
    pub charge_squared: f64,
    pub rock: f64,
}

impl FeatureVector {
    /// Row in `FEATURE_COLUMNS` order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.distance,
            self.charge,
            self.scaled_distance,
            self.rock,
            self.distance_x_charge,
            self.distance_squared,
            self.charge_squared,
        ]
    }
}

/// Expand an observation into its feature vector.
///
/// Fails fast instead of producing an infinite or NaN feature.
pub fn derive(obs: &BlastObservation) -> Result<FeatureVector, FeatureError> {
    let distance = obs.distance_m;
    let charge = obs.charge_kg;

    // NaN fails both comparisons, so test the positive case.
    if !(charge.is_finite() && charge > 0.0) {
        return Err(FeatureError::NonPositiveCharge(charge));
    }
    if !(distance.is_finite() && distance > 0.0) {
        return Err(FeatureError::NonPositiveDistance(distance));
    }

    let features = FeatureVector {
        distance,
        charge,
        scaled_distance: distance / charge.sqrt(),
        distance_x_charge: distance * charge,
        distance_squared: distance * distance,
        charge_squared: charge * charge,
        rock: obs.rock_type.encoding(),
    };

    if let Some((column, _)) = FEATURE_COLUMNS
        .into_iter()
        .zip(features.to_row())
        .find(|(_, value)| !value.is_finite())
    {
        return Err(FeatureError::NonFiniteFeature { column });
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RockType;

    #[test]
    fn test_reference_scenario() {
        let obs = BlastObservation::new(100.0, 50.0, RockType::Coal);
        let f = derive(&obs).unwrap();

        assert_eq!(f.distance, 100.0);
        assert_eq!(f.charge, 50.0);
        assert_eq!(f.scaled_distance, 100.0 / 50.0_f64.sqrt());
        assert!((f.scaled_distance - 14.142).abs() < 1e-3);
        assert_eq!(f.distance_x_charge, 5000.0);
        assert_eq!(f.distance_squared, 10000.0);
        assert_eq!(f.charge_squared, 2500.0);
        assert_eq!(f.rock, 0.0);
    }

    #[test]
    fn test_row_order_matches_columns() {
        let obs = BlastObservation::new(10.0, 4.0, RockType::Limestone);
        let row = derive(&obs).unwrap().to_row();

        assert_eq!(row.len(), FEATURE_COLUMNS.len());
        assert_eq!(row[0], 10.0); // distance
        assert_eq!(row[1], 4.0); // charge
        assert_eq!(row[2], 5.0); // scaled_distance
        assert_eq!(row[3], 1.0); // rock
        assert_eq!(row[4], 40.0); // distance_x_charge
        assert_eq!(row[5], 100.0); // distance_squared
        assert_eq!(row[6], 16.0); // charge_squared
    }

    #[test]
    fn test_zero_charge_fails_fast() {
        let obs = BlastObservation::new(100.0, 0.0, RockType::Coal);
        assert_eq!(derive(&obs), Err(FeatureError::NonPositiveCharge(0.0)));
    }

    #[test]
    fn test_negative_and_nan_inputs_rejected() {
        let neg_charge = BlastObservation::new(100.0, -1.0, RockType::Coal);
        assert!(matches!(derive(&neg_charge), Err(FeatureError::NonPositiveCharge(_))));

        let nan_charge = BlastObservation::new(100.0, f64::NAN, RockType::Coal);
        assert!(matches!(derive(&nan_charge), Err(FeatureError::NonPositiveCharge(_))));

        let zero_distance = BlastObservation::new(0.0, 10.0, RockType::Coal);
        assert!(matches!(
            derive(&zero_distance),
            Err(FeatureError::NonPositiveDistance(_))
        ));

        let inf_distance = BlastObservation::new(f64::INFINITY, 10.0, RockType::Coal);
        assert!(matches!(
            derive(&inf_distance),
            Err(FeatureError::NonPositiveDistance(_))
        ));
    }

    #[test]
    fn test_overflowing_features_rejected() {
        let huge = BlastObservation::new(1e200, 1e200, RockType::Coal);
        assert_eq!(
            derive(&huge),
            Err(FeatureError::NonFiniteFeature {
                column: "distance_x_charge"
            })
        );

        let far = BlastObservation::new(1e200, 1.0, RockType::Limestone);
        assert_eq!(
            derive(&far),
            Err(FeatureError::NonFiniteFeature {
                column: "distance_squared"
            })
        );

        let tiny_charge = BlastObservation::new(1e300, 1e-300, RockType::Coal);
        assert_eq!(
            derive(&tiny_charge),
            Err(FeatureError::NonFiniteFeature {
                column: "scaled_distance"
            })
        );
    }

    #[test]
    fn test_rock_encoding_flows_through() {
        let coal = derive(&BlastObservation::new(50.0, 9.0, RockType::Coal)).unwrap();
        let lime = derive(&BlastObservation::new(50.0, 9.0, RockType::Limestone)).unwrap();
        assert_ne!(coal.rock, lime.rock);
        assert_eq!(coal.scaled_distance, lime.scaled_distance);
    }
}
