//! Safety-zone thresholds and rounding constants

/// PPV safety-zone boundaries (mm/s)
pub mod safety_thresholds {
    /// PPV strictly below this is Safe (mm/s)
    pub const SAFE_BELOW_MM_S: f64 = 5.0;
    /// PPV strictly above this is Dangerous (mm/s)
    pub const DANGEROUS_ABOVE_MM_S: f64 = 10.0;
}

/// Decimal places kept on a predicted PPV before classification and export.
pub const PPV_DECIMALS: i32 = 3;
