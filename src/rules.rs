//! Economy rules shared by the client economy and the token ledger.
//!
//! Both variants go through these functions so the growth formulas, level
//! thresholds and reward curve cannot drift apart.

use crate::error::{EconomyError, Result};
use serde::{Deserialize, Serialize};

/// Basis points in one whole (100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Multiplicative growth factor expressed as an integer ratio.
///
/// `Growth::new(6, 5)` is x1.2. Results are floored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Growth {
    pub numerator: u64,
    pub denominator: u64,
}

impl Growth {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `floor(value * numerator / denominator)`, saturating at `u64::MAX`.
    pub fn apply(&self, value: u64) -> u64 {
        if self.denominator == 0 {
            return value;
        }
        let scaled = value as u128 * self.numerator as u128 / self.denominator as u128;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// A growth factor must never shrink a value.
    pub fn is_non_decreasing(&self) -> bool {
        self.denominator > 0 && self.numerator >= self.denominator
    }
}

/// Number of `threshold` boundaries crossed going from `before` to `after`.
///
/// Crossing two boundaries in one step counts twice.
pub fn thresholds_crossed(before: u64, after: u64, threshold: u64) -> u64 {
    if threshold == 0 || after <= before {
        return 0;
    }
    after / threshold - before / threshold
}

/// Clamp a number of pending level-ups so `level` never passes `max_level`.
pub fn capped_level_ups(level: u32, pending: u64, max_level: Option<u32>) -> u32 {
    let pending = u32::try_from(pending).unwrap_or(u32::MAX);
    match max_level {
        Some(max) => pending.min(max.saturating_sub(level)),
        None => pending.min(u32::MAX - level),
    }
}

/// Level-dependent reward multiplier in basis points.
///
/// Level 1 is 1x; every level above adds `bps_per_level`.
pub fn level_multiplier_bps(level: u32, bps_per_level: u128) -> u128 {
    let extra_levels = level.saturating_sub(1) as u128;
    BPS_DENOMINATOR.saturating_add(extra_levels.saturating_mul(bps_per_level))
}

/// Ledger mining reward for `amount` base units at `level`.
///
/// `reward = amount * base_rate / unit * multiplier(level) / 10000`
pub fn mining_reward(
    amount: u128,
    base_rate: u128,
    unit: u128,
    level: u32,
    bps_per_level: u128,
) -> Result<u128> {
    if unit == 0 {
        return Err(EconomyError::InvalidConfig("token unit must be non-zero".into()));
    }
    let multiplier = level_multiplier_bps(level, bps_per_level);
    mul_div(amount, base_rate, unit)
        .and_then(|scaled| mul_div(scaled, multiplier, BPS_DENOMINATOR))
        .ok_or(EconomyError::InvalidAmount)
}

/// `floor(a * b / d)` without overflowing on the intermediate product when
/// `(d - 1) * b` fits in a u128.
fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    let whole = (a / d).checked_mul(b)?;
    let part = (a % d).checked_mul(b)? / d;
    whole.checked_add(part)
}

/// Level implied by a lifetime mined total on the ledger.
pub fn level_for_total_mined(total_mined: u128, threshold: u128, max_level: u32) -> u32 {
    if threshold == 0 {
        return 1;
    }
    let earned = total_mined / threshold;
    let level = u32::try_from(earned).unwrap_or(u32::MAX).saturating_add(1);
    level.min(max_level.max(1))
}
