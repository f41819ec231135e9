//! Stat upgrade formula
//!
//! `additional = trunc(old × multiplier^(threshold − item_level)) − old`

/// Default per-level growth factor
pub const DEFAULT_STAT_MULTIPLIER: f64 = 1.0109;

/// Exponential stat scaling keyed on the gap between the unlocked threshold
/// and the item's own level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatFormula {
    pub multiplier: f64,
}

impl Default for StatFormula {
    fn default() -> Self {
        StatFormula {
            multiplier: DEFAULT_STAT_MULTIPLIER,
        }
    }
}

impl StatFormula {
    pub fn new(multiplier: f64) -> Self {
        StatFormula { multiplier }
    }

    /// Bonus to add on top of `base_stat`
    ///
    /// Returns 0 when the item already sits at or above the threshold, or
    /// when the base stat is not positive. Truncation can also collapse a
    /// small gap to 0, which callers treat as "no bonus".
    pub fn compute_delta(&self, base_stat: i32, threshold_level: u32, item_level: u32) -> i32 {
        compute_delta(base_stat, threshold_level, item_level, self.multiplier)
    }
}

/// Free-function form of [`StatFormula::compute_delta`]
pub fn compute_delta(base_stat: i32, threshold_level: u32, item_level: u32, multiplier: f64) -> i32 {
    if item_level >= threshold_level || base_stat <= 0 {
        return 0;
    }

    let level_diff = threshold_level - item_level;
    let scale = multiplier.powf(f64::from(level_diff));
    // `as` truncates toward zero and saturates at the i32 bounds
    let scaled = (f64::from(base_stat) * scale) as i32;
    scaled.saturating_sub(base_stat)
}
