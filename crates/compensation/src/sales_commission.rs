//! Sales commission with waiting-time decay.
//!
//! The commission pool `value × rate` is conserved; as a closed deal waits
//! for a project manager, a growing share moves into the PM bonus pool.

use serde::{Deserialize, Serialize};

use crate::money::Money;

pub const DEFAULT_COMMISSION_DECAY_DAYS: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedCommission {
    pub commission: Money,
    pub pm_bonus_contribution: Money,
}

pub fn calculate_sales_commission(project_value: Money, commission_rate: f64) -> Money {
    project_value * commission_rate
}

/// Fraction of the pool still owed to sales after `days_waiting` days.
///
/// A non-positive `max_days` has no decay window: nothing decays before the
/// deal waits at all, everything has decayed once it does.
pub fn commission_decay_factor(days_waiting: f64, max_days: f64) -> f64 {
    if max_days <= 0.0 {
        return if days_waiting <= 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - days_waiting / max_days).max(0.0)
}

pub fn calculate_adjusted_sales_commission(
    project_value: Money,
    base_commission_rate: f64,
    days_waiting: f64,
    max_days: f64,
) -> AdjustedCommission {
    let decay_factor = commission_decay_factor(days_waiting, max_days);
    let pool = project_value * base_commission_rate;
    AdjustedCommission {
        commission: pool * decay_factor,
        pm_bonus_contribution: pool * (1.0 - decay_factor),
    }
}
