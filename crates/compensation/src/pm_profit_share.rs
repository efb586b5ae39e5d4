//! Project-manager profit share.
//!
//! profit      = budget − spent
//! overdraft   = max(0, spent − budget)
//! share       = profit × x            (only when profit > 0)
//! penalty     = overdraft × (k × x)   (k = overdraft penalty, default 1.5)
//! net payout  = max(0, share − penalty + sales_bonus)
//!
//! Overrunning a budget costs more per dollar than staying under it earns,
//! and the payout floors at zero.

use serde::{Deserialize, Serialize};

use crate::money::Money;

pub const DEFAULT_OVERDRAFT_PENALTY: f64 = 1.5;
pub const DEFAULT_PICKUP_BONUS_RATE: f64 = 0.001;

/// Projects with this many days left are not urgent.
pub const PICKUP_URGENCY_WINDOW_DAYS: f64 = 7.0;

/// Ceiling share of project value a pickup bonus approaches.
pub const PICKUP_BONUS_CEILING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmPayoutBreakdown {
    pub project_budget: Money,
    pub spent: Money,
    /// Negative on a loss.
    pub profit: Money,
    pub overdraft: Money,
    pub profit_share: Money,
    pub penalty: Money,
    pub sales_bonus: Money,
    pub net_payout: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmPayout {
    pub payout: Money,
    pub breakdown: PmPayoutBreakdown,
}

pub fn calculate_pm_payout(
    project_budget: Money,
    spent: Money,
    profit_share_rate: f64,
    overdraft_penalty: f64,
    sales_bonus: Money,
) -> PmPayout {
    let profit = project_budget - spent;
    let overdraft = (spent - project_budget).max(0.0);
    let profit_share = if profit > 0.0 {
        profit * profit_share_rate
    } else {
        0.0
    };
    let penalty = overdraft * (overdraft_penalty * profit_share_rate);
    let net_payout = (profit_share - penalty + sales_bonus).max(0.0);

    PmPayout {
        payout: net_payout,
        breakdown: PmPayoutBreakdown {
            project_budget,
            spent,
            profit,
            overdraft,
            profit_share,
            penalty,
            sales_bonus,
            net_payout,
        },
    }
}

/// Bonus for picking up a project with fewer than seven days left.
///
/// bonus = e^(−rate × value × (7 − days_left)) × value × 0.1
///
/// Larger projects and later pickups shrink the exponential term, so the
/// bonus stays under 10% of project value.
pub fn calculate_pm_pickup_bonus(project_value: Money, days_left: f64, rate: f64) -> Money {
    if days_left >= PICKUP_URGENCY_WINDOW_DAYS {
        return 0.0;
    }
    let urgency_factor = PICKUP_URGENCY_WINDOW_DAYS - days_left;
    (-rate * project_value * urgency_factor).exp() * project_value * PICKUP_BONUS_CEILING
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn overrun_floors_at_zero() {
        let result = calculate_pm_payout(10_000.0, 12_000.0, 0.5, 1.5, 0.0);
        let b = result.breakdown;
        assert_eq!(b.profit, -2_000.0);
        assert_eq!(b.profit_share, 0.0);
        assert_eq!(b.overdraft, 2_000.0);
        assert_relative_eq!(b.penalty, 1_500.0, epsilon = 1e-9);
        assert_eq!(result.payout, 0.0);
        assert_eq!(b.net_payout, result.payout);
    }

    #[test]
    fn under_budget_shares_profit() {
        let result = calculate_pm_payout(10_000.0, 8_000.0, 0.5, DEFAULT_OVERDRAFT_PENALTY, 0.0);
        assert_eq!(result.breakdown.overdraft, 0.0);
        assert_eq!(result.breakdown.penalty, 0.0);
        assert_relative_eq!(result.payout, 1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn sales_bonus_offsets_penalty() {
        let result = calculate_pm_payout(10_000.0, 10_400.0, 0.5, 1.5, 500.0);
        // penalty = 400 × 0.75 = 300
        assert_relative_eq!(result.breakdown.penalty, 300.0, epsilon = 1e-9);
        assert_relative_eq!(result.payout, 200.0, epsilon = 1e-9);
        assert_eq!(result.breakdown.sales_bonus, 500.0);
    }

    #[test]
    fn exact_budget_pays_only_bonus() {
        let result = calculate_pm_payout(5_000.0, 5_000.0, 0.5, 1.5, 25.0);
        assert_eq!(result.breakdown.profit, 0.0);
        assert_eq!(result.breakdown.profit_share, 0.0);
        assert_eq!(result.payout, 25.0);
    }

    #[test]
    fn pickup_bonus_zero_outside_window() {
        assert_eq!(calculate_pm_pickup_bonus(1_000.0, 7.0, DEFAULT_PICKUP_BONUS_RATE), 0.0);
        assert_eq!(calculate_pm_pickup_bonus(1_000.0, 8.0, DEFAULT_PICKUP_BONUS_RATE), 0.0);
    }

    #[test]
    fn pickup_bonus_literal_formula() {
        // urgency 1 → e^(−1) × 100
        assert_relative_eq!(
            calculate_pm_pickup_bonus(1_000.0, 6.0, 0.001),
            (-1.0f64).exp() * 100.0,
            epsilon = 1e-9
        );
        // more urgency shrinks the bonus for the same project
        let relaxed = calculate_pm_pickup_bonus(1_000.0, 6.0, 0.001);
        let urgent = calculate_pm_pickup_bonus(1_000.0, 0.0, 0.001);
        assert!(urgent < relaxed);
        // cheap projects approach the 10% ceiling
        let small = calculate_pm_pickup_bonus(10.0, 6.5, 0.001);
        assert!(small < 1.0 && small > 0.99);
    }
}
