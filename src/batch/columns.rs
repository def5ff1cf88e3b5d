//! Best-effort column discovery for uploaded tables
//!
//! Headers are matched after trimming and lowercasing:
//! - distance: first header containing `distance`
//! - charge: first header containing `charge`
//! - rock type: first header containing both `rock` and `type`
//!
//! Each role is matched independently and the first match wins, so
//! duplicate or ambiguous headers resolve the same way on every upload.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A column the scorer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Distance,
    Charge,
    RockType,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Distance, ColumnRole::Charge, ColumnRole::RockType];

    /// Does a normalized (trimmed, lowercase) header fill this role?
    fn matches(self, normalized: &str) -> bool {
        match self {
            ColumnRole::Distance => normalized.contains("distance"),
            ColumnRole::Charge => normalized.contains("charge"),
            ColumnRole::RockType => normalized.contains("rock") && normalized.contains("type"),
        }
    }

    /// What a matching header looks like, for error messages.
    pub fn hint(self) -> &'static str {
        match self {
            ColumnRole::Distance => "a header containing 'distance'",
            ColumnRole::Charge => "a header containing 'charge'",
            ColumnRole::RockType => "a header containing 'rock' and 'type'",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Distance => write!(f, "distance"),
            ColumnRole::Charge => write!(f, "charge"),
            ColumnRole::RockType => write!(f, "rock type"),
        }
    }
}

/// Required roles that no header matched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required column(s): {}", describe_missing(.missing))]
pub struct MissingColumns {
    pub missing: Vec<ColumnRole>,
    /// Headers that were present in the upload
    pub available: Vec<String>,
}

fn describe_missing(missing: &[ColumnRole]) -> String {
    missing
        .iter()
        .map(|role| format!("{role} ({})", role.hint()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Header matched to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedColumn {
    pub index: usize,
    pub header: String,
}

/// Resolved positions of the three required columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub distance: MatchedColumn,
    pub charge: MatchedColumn,
    pub rock_type: MatchedColumn,
}

impl ColumnMapping {
    /// Match headers to roles, or report every role left unmatched.
    pub fn discover<S: AsRef<str>>(headers: &[S]) -> Result<Self, MissingColumns> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();

        let find = |role: ColumnRole| {
            normalized
                .iter()
                .position(|h| role.matches(h))
                .map(|index| MatchedColumn {
                    index,
                    header: headers[index].as_ref().to_string(),
                })
        };

        match (
            find(ColumnRole::Distance),
            find(ColumnRole::Charge),
            find(ColumnRole::RockType),
        ) {
            (Some(distance), Some(charge), Some(rock_type)) => Ok(Self {
                distance,
                charge,
                rock_type,
            }),
            _ => Err(MissingColumns {
                missing: ColumnRole::ALL
                    .into_iter()
                    .filter(|role| find(*role).is_none())
                    .collect(),
                available: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            }),
        }
    }

    pub fn column(&self, role: ColumnRole) -> &MatchedColumn {
        match role {
            ColumnRole::Distance => &self.distance,
            ColumnRole::Charge => &self.charge,
            ColumnRole::RockType => &self.rock_type,
        }
    }
}
