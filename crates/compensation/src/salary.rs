//! Employee salary split and per-task payouts.
//!
//! An employee's compensation is split by the ratio `r`:
//!   base  = base_salary × r
//!   tasks = completed_task_value × (1 − r)
//!
//! Task payouts are scaled by an urgency multiplier that rises linearly from
//! 1.0 (14+ days out) to the configured maximum (due today or overdue).
//! Callers clamp `r` through [`crate::bounds::validate_r`] before calling in.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Multiplier applied when a task carries no urgency.
pub const DEFAULT_URGENCY_MULTIPLIER: f64 = 1.0;

/// Multiplier applied to overdue work unless the organization overrides it.
pub const DEFAULT_MAX_URGENCY_MULTIPLIER: f64 = 1.5;

/// Deadlines further out than this earn no urgency premium.
pub const URGENCY_WINDOW_DAYS: f64 = 14.0;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Base/task split of an employee's pay. `total == base + tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub base: Money,
    pub tasks: Money,
    pub total: Money,
    pub r: f64,
}

/// Annualized salary preview. Never committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualProjection {
    pub projected: Money,
    pub from_base: Money,
    pub from_tasks: Money,
}

pub fn calculate_salary_breakdown(
    base_salary: Money,
    r: f64,
    completed_tasks_value: Money,
) -> SalaryBreakdown {
    let base = base_salary * r;
    let tasks = completed_tasks_value * (1.0 - r);
    SalaryBreakdown {
        base,
        tasks,
        total: base + tasks,
        r,
    }
}

/// Cash owed for one completed task. The base component is paid on the
/// payroll cadence, not here.
pub fn calculate_task_payout(task_value: Money, r: f64, urgency_multiplier: f64) -> Money {
    task_value * (1.0 - r) * urgency_multiplier
}

/// Urgency premium for a task due in `days_until_deadline` days.
///
/// Non-increasing in `days_until_deadline`: exactly `max_multiplier` at or
/// below zero days, exactly 1.0 at or beyond 14 days.
pub fn calculate_urgency_multiplier(days_until_deadline: f64, max_multiplier: f64) -> f64 {
    if days_until_deadline <= 0.0 {
        return max_multiplier;
    }
    if days_until_deadline >= URGENCY_WINDOW_DAYS {
        return 1.0;
    }
    let closeness = (URGENCY_WINDOW_DAYS - days_until_deadline) / URGENCY_WINDOW_DAYS;
    (1.0 + closeness * (max_multiplier - 1.0)).min(max_multiplier)
}

pub fn project_annual_salary(
    base_salary: Money,
    r: f64,
    avg_monthly_task_value: Money,
) -> AnnualProjection {
    let from_base = base_salary * r;
    let from_tasks = avg_monthly_task_value * MONTHS_PER_YEAR * (1.0 - r);
    AnnualProjection {
        projected: from_base + from_tasks,
        from_base,
        from_tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn breakdown_reference_case() {
        let breakdown = calculate_salary_breakdown(6000.0, 0.7, 1000.0);
        assert_relative_eq!(breakdown.base, 4200.0, epsilon = 1e-9);
        assert_relative_eq!(breakdown.tasks, 300.0, epsilon = 1e-9);
        assert_relative_eq!(breakdown.total, 4500.0, epsilon = 1e-9);
        assert_eq!(breakdown.r, 0.7);
    }

    #[test]
    fn breakdown_extremes() {
        let all_base = calculate_salary_breakdown(5000.0, 1.0, 800.0);
        assert_eq!(all_base.tasks, 0.0);
        assert_eq!(all_base.total, 5000.0);

        let all_tasks = calculate_salary_breakdown(5000.0, 0.0, 800.0);
        assert_eq!(all_tasks.base, 0.0);
        assert_eq!(all_tasks.total, 800.0);
    }

    #[test]
    fn task_payout_with_urgency() {
        assert_relative_eq!(calculate_task_payout(200.0, 0.7, 1.5), 90.0, epsilon = 1e-9);
        assert_relative_eq!(
            calculate_task_payout(200.0, 0.7, DEFAULT_URGENCY_MULTIPLIER),
            60.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn urgency_boundaries_are_exact() {
        assert_eq!(calculate_urgency_multiplier(14.0, 1.5), 1.0);
        assert_eq!(calculate_urgency_multiplier(30.0, 1.5), 1.0);
        assert_eq!(calculate_urgency_multiplier(0.0, 1.5), 1.5);
        assert_eq!(calculate_urgency_multiplier(-3.0, 2.0), 2.0);
    }

    #[test]
    fn urgency_interpolates_linearly() {
        assert_relative_eq!(calculate_urgency_multiplier(7.0, 1.5), 1.25, epsilon = 1e-12);
        assert_relative_eq!(
            calculate_urgency_multiplier(10.5, 1.5),
            1.125,
            epsilon = 1e-12
        );
    }

    #[test]
    fn urgency_never_increases_with_more_time() {
        let mut previous = calculate_urgency_multiplier(0.0, DEFAULT_MAX_URGENCY_MULTIPLIER);
        for step in 1..=28 {
            let days = step as f64 * 0.5;
            let current = calculate_urgency_multiplier(days, DEFAULT_MAX_URGENCY_MULTIPLIER);
            assert!(current <= previous, "day {days}: {current} > {previous}");
            previous = current;
        }
    }

    #[test]
    fn annual_projection() {
        let projection = project_annual_salary(60_000.0, 0.7, 2_000.0);
        assert_relative_eq!(projection.from_base, 42_000.0, epsilon = 1e-9);
        assert_relative_eq!(projection.from_tasks, 7_200.0, epsilon = 1e-9);
        assert_relative_eq!(projection.projected, 49_200.0, epsilon = 1e-9);
    }
}
