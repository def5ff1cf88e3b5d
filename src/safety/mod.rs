//! Safety-zone classification of predicted PPV
//!
//! | zone      | condition          |
//! |-----------|--------------------|
//! | Safe      | PPV < 5 mm/s       |
//! | Moderate  | 5 ≤ PPV ≤ 10 mm/s  |
//! | Dangerous | PPV > 10 mm/s      |
//!
//! Both boundaries belong to Moderate. Callers classify the value *after*
//! rounding to 3 decimals, so 4.9996 rounds to 5.000 and is Moderate.

use crate::types::thresholds::safety_thresholds::{DANGEROUS_ABOVE_MM_S, SAFE_BELOW_MM_S};
use crate::types::SafetyLabel;

/// Map a PPV (mm/s) to its safety zone.
pub fn classify(ppv_mm_s: f64) -> SafetyLabel {
    if ppv_mm_s < SAFE_BELOW_MM_S {
        SafetyLabel::Safe
    } else if ppv_mm_s <= DANGEROUS_ABOVE_MM_S {
        SafetyLabel::Moderate
    } else {
        SafetyLabel::Dangerous
    }
}
