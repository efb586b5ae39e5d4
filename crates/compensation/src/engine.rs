//! Organization-configured payout engine.
//!
//! Binds an [`OrgCompensationParams`] to the formula modules, applies the
//! configured [`PreconditionPolicy`] to caller inputs, and returns ledger
//! rows ready to persist. The engine holds only immutable configuration and
//! can be shared freely across threads.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bounds::{validate_r, RValidation};
use crate::config::{OrgCompensationParams, PreconditionPolicy};
use crate::error::{check_finite, ParamError};
use crate::ledger::{PayoutKind, PayoutLedgerEntry, PayoutRole};
use crate::money::Money;
use crate::pm_profit_share::{calculate_pm_payout, calculate_pm_pickup_bonus, PmPayout};
use crate::qc_shapley::{
    calculate_effective_sample_size, calculate_qc_breakdown, calculate_worker_baseline,
    check_preview_inputs, expected_qc_payout, expected_remaining_qc, has_sufficient_signal,
    QcPayoutBreakdown, ShapleyParams,
};
use crate::salary::{
    calculate_salary_breakdown, calculate_task_payout, calculate_urgency_multiplier,
    project_annual_salary, AnnualProjection, SalaryBreakdown,
};
use crate::sales_commission::{calculate_adjusted_sales_commission, AdjustedCommission};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskPayout {
    /// Ratio actually applied after bounds resolution.
    pub r: f64,
    pub r_clamped: bool,
    pub urgency_multiplier: f64,
    pub amount: Money,
    pub entry: PayoutLedgerEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcSettlement {
    pub params: ShapleyParams,
    pub breakdown: QcPayoutBreakdown,
    pub effective_sample_size: f64,
    /// Review panel carried too little independent signal; QC pay held back.
    pub withheld: bool,
    pub qc_amount: Money,
    pub entries: Vec<PayoutLedgerEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QcPreview {
    pub first_marginal: Money,
    pub expected: Money,
    pub expected_after_rejection: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmSettlement {
    pub payout: PmPayout,
    pub entry: PayoutLedgerEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSettlement {
    pub split: AdjustedCommission,
    pub entries: Vec<PayoutLedgerEntry>,
}

#[derive(Debug, Clone)]
pub struct PayoutEngine {
    params: OrgCompensationParams,
}

impl PayoutEngine {
    pub fn new(params: OrgCompensationParams) -> Result<Self, ParamError> {
        params.validate()?;
        for note in params.recommended_tuning_warnings() {
            warn!(target: "compensation", %note, "qc tuning outside recommended range");
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &OrgCompensationParams {
        &self.params
    }

    pub fn check_r(&self, r: f64) -> RValidation {
        validate_r(r, &self.params.r_bounds)
    }

    fn resolve_r(&self, r: f64) -> Result<(f64, bool), ParamError> {
        check_finite("r", r)?;
        let validation = self.check_r(r);
        if validation.valid {
            return Ok((r, false));
        }
        match self.params.precondition_policy {
            PreconditionPolicy::Reject => Err(ParamError::RatioOutOfBounds {
                r,
                min: self.params.r_bounds.min,
                max: self.params.r_bounds.max,
            }),
            PreconditionPolicy::Clamp => {
                warn!(
                    target: "compensation",
                    requested = r,
                    clamped = validation.clamped,
                    "salary ratio outside organization bounds"
                );
                Ok((validation.clamped, true))
            }
        }
    }

    fn resolve_amount(&self, name: &'static str, value: Money) -> Result<Money, ParamError> {
        check_finite(name, value)?;
        if value >= 0.0 {
            return Ok(value);
        }
        match self.params.precondition_policy {
            PreconditionPolicy::Reject => Err(ParamError::NegativeAmount { name, value }),
            PreconditionPolicy::Clamp => {
                warn!(target: "compensation", field = name, value, "negative amount clamped to zero");
                Ok(0.0)
            }
        }
    }

    fn resolve_rate(&self, name: &'static str, value: f64) -> Result<f64, ParamError> {
        check_finite(name, value)?;
        if (0.0..=1.0).contains(&value) {
            return Ok(value);
        }
        match self.params.precondition_policy {
            PreconditionPolicy::Reject => Err(ParamError::RateOutOfRange { name, value }),
            PreconditionPolicy::Clamp => {
                let clamped = value.clamp(0.0, 1.0);
                warn!(target: "compensation", field = name, value, clamped, "rate clamped");
                Ok(clamped)
            }
        }
    }

    pub fn salary_breakdown(
        &self,
        base_salary: Money,
        r: f64,
        completed_tasks_value: Money,
    ) -> Result<SalaryBreakdown, ParamError> {
        let base_salary = self.resolve_amount("base_salary", base_salary)?;
        let completed_tasks_value =
            self.resolve_amount("completed_tasks_value", completed_tasks_value)?;
        let (r, _) = self.resolve_r(r)?;
        Ok(calculate_salary_breakdown(base_salary, r, completed_tasks_value))
    }

    pub fn annual_projection(
        &self,
        base_salary: Money,
        r: f64,
        avg_monthly_task_value: Money,
    ) -> Result<AnnualProjection, ParamError> {
        let base_salary = self.resolve_amount("base_salary", base_salary)?;
        let avg_monthly_task_value =
            self.resolve_amount("avg_monthly_task_value", avg_monthly_task_value)?;
        let (r, _) = self.resolve_r(r)?;
        Ok(project_annual_salary(base_salary, r, avg_monthly_task_value))
    }

    /// Per-task cash for a completed task, scaled by deadline urgency.
    pub fn task_payout(
        &self,
        task_value: Money,
        r: f64,
        days_until_deadline: f64,
    ) -> Result<TaskPayout, ParamError> {
        let task_value = self.resolve_amount("task_value", task_value)?;
        check_finite("days_until_deadline", days_until_deadline)?;
        let (r, r_clamped) = self.resolve_r(r)?;
        let urgency_multiplier =
            calculate_urgency_multiplier(days_until_deadline, self.params.urgency_max_multiplier);
        let amount = calculate_task_payout(task_value, r, urgency_multiplier);
        debug!(
            target: "compensation",
            task_value,
            r,
            urgency_multiplier,
            amount,
            "task payout computed"
        );
        Ok(TaskPayout {
            r,
            r_clamped,
            urgency_multiplier,
            amount,
            entry: PayoutLedgerEntry::new(PayoutRole::Worker, PayoutKind::TaskCompletion, amount),
        })
    }

    /// Settle QC compensation for a task after `passes` review passes.
    ///
    /// `review_weights` describes the review panel; QC pay is withheld when
    /// its effective sample size falls below `min_effective_reviews`. Weights
    /// go through the precondition policy like any other amount.
    pub fn qc_settlement(
        &self,
        task_value: Money,
        p0: f64,
        passes: u32,
        review_weights: &[f64],
    ) -> Result<QcSettlement, ParamError> {
        let task_value = self.resolve_amount("task_value", task_value)?;
        check_finite("p0", p0)?;
        let worker_baseline =
            calculate_worker_baseline(task_value, self.params.worker_baseline_ratio);
        let requested = ShapleyParams::new(
            task_value,
            worker_baseline,
            p0,
            self.params.qc_beta,
            self.params.qc_gamma,
            passes,
        );
        let params = match requested.validate() {
            Ok(()) => requested,
            Err(err) => match self.params.precondition_policy {
                PreconditionPolicy::Reject => return Err(err),
                PreconditionPolicy::Clamp => {
                    warn!(target: "compensation", error = %err, "qc parameters clamped");
                    requested.clamped()
                }
            },
        };

        let breakdown = calculate_qc_breakdown(&params, self.params.qc_max_passes);
        if breakdown.normalized {
            debug!(
                target: "compensation",
                alpha = breakdown.alpha,
                task_value,
                "qc marginals scaled to task value cap"
            );
        }

        let weights = review_weights
            .iter()
            .map(|&w| self.resolve_amount("review_weight", w))
            .collect::<Result<Vec<_>, _>>()?;
        let effective_sample_size = calculate_effective_sample_size(&weights);
        let withheld = !has_sufficient_signal(&weights, self.params.min_effective_reviews);
        let qc_amount = if withheld {
            warn!(
                target: "compensation",
                effective_sample_size,
                required = self.params.min_effective_reviews,
                "qc payout withheld: insufficient independent review signal"
            );
            0.0
        } else {
            breakdown.payout
        };
        debug!(
            target: "compensation",
            passes = breakdown.passes_paid,
            qc_amount,
            worker_baseline = params.worker_baseline,
            "qc settlement computed"
        );

        let entries = vec![
            PayoutLedgerEntry::new(
                PayoutRole::Worker,
                PayoutKind::WorkerBaseline,
                params.worker_baseline,
            ),
            PayoutLedgerEntry::new(PayoutRole::QualityControl, PayoutKind::QcReview, qc_amount),
        ];
        Ok(QcSettlement {
            params,
            breakdown,
            effective_sample_size,
            withheld,
            qc_amount,
            entries,
        })
    }

    /// Expected QC cost for a task before any pass has been reviewed.
    pub fn qc_preview(&self, task_value: Money, p0: f64) -> Result<QcPreview, ParamError> {
        let task_value = self.resolve_amount("task_value", task_value)?;
        let p0 = self.resolve_rate("p0", p0)?;
        let gamma = self.params.qc_gamma;
        let p_re = self.params.resubmission_success_probability;
        let first_marginal = self.params.qc_beta * p0 * task_value;
        check_preview_inputs(first_marginal, p0, gamma)?;
        Ok(QcPreview {
            first_marginal,
            expected: expected_qc_payout(first_marginal, p0, gamma, p_re),
            expected_after_rejection: expected_remaining_qc(first_marginal, gamma, p_re),
        })
    }

    pub fn pm_settlement(
        &self,
        project_budget: Money,
        spent: Money,
        sales_bonus: Money,
    ) -> Result<PmSettlement, ParamError> {
        let project_budget = self.resolve_amount("project_budget", project_budget)?;
        let spent = self.resolve_amount("spent", spent)?;
        let sales_bonus = self.resolve_amount("sales_bonus", sales_bonus)?;
        let payout = calculate_pm_payout(
            project_budget,
            spent,
            self.params.pm_x,
            self.params.pm_overdraft_penalty,
            sales_bonus,
        );
        if payout.breakdown.overdraft > 0.0 {
            debug!(
                target: "compensation",
                overdraft = payout.breakdown.overdraft,
                penalty = payout.breakdown.penalty,
                "project closed over budget"
            );
        }
        Ok(PmSettlement {
            payout,
            entry: PayoutLedgerEntry::new(
                PayoutRole::ProjectManager,
                PayoutKind::PmProfitShare,
                payout.payout,
            ),
        })
    }

    pub fn pm_pickup_bonus(
        &self,
        project_value: Money,
        days_left: f64,
    ) -> Result<PayoutLedgerEntry, ParamError> {
        let project_value = self.resolve_amount("project_value", project_value)?;
        check_finite("days_left", days_left)?;
        let bonus =
            calculate_pm_pickup_bonus(project_value, days_left, self.params.pickup_bonus_rate);
        Ok(PayoutLedgerEntry::new(
            PayoutRole::ProjectManager,
            PayoutKind::PmPickupBonus,
            bonus,
        ))
    }

    /// Split the sales commission pool between sales and the PM bonus pool.
    pub fn sales_settlement(
        &self,
        project_value: Money,
        days_waiting: f64,
    ) -> Result<SalesSettlement, ParamError> {
        let project_value = self.resolve_amount("project_value", project_value)?;
        let days_waiting = self.resolve_amount("days_waiting", days_waiting)?;
        let split = calculate_adjusted_sales_commission(
            project_value,
            self.params.sales_commission_rate,
            days_waiting,
            self.params.sales_decay_max_days,
        );
        let entries = vec![
            PayoutLedgerEntry::new(PayoutRole::Sales, PayoutKind::SalesCommission, split.commission),
            PayoutLedgerEntry::new(
                PayoutRole::ProjectManager,
                PayoutKind::PmBonusPoolTransfer,
                split.pm_bonus_contribution,
            ),
        ];
        Ok(SalesSettlement { split, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> PayoutEngine {
        PayoutEngine::new(OrgCompensationParams::default()).unwrap()
    }

    fn clamping_engine() -> PayoutEngine {
        PayoutEngine::new(OrgCompensationParams {
            precondition_policy: PreconditionPolicy::Clamp,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PayoutEngine>();
    }

    #[test]
    fn rejects_invalid_configuration() {
        let params = OrgCompensationParams {
            r_bounds: crate::bounds::RBounds::new(0.9, 0.5),
            ..Default::default()
        };
        assert!(PayoutEngine::new(params).is_err());
    }

    #[test]
    fn task_payout_applies_urgency() {
        let payout = engine().task_payout(200.0, 0.7, 0.0).unwrap();
        assert_relative_eq!(payout.amount, 90.0, epsilon = 1e-9);
        assert_eq!(payout.urgency_multiplier, 1.5);
        assert!(!payout.r_clamped);
        assert_eq!(payout.entry.amount_cents, 9_000);
        assert_eq!(payout.entry.kind, PayoutKind::TaskCompletion);
    }

    #[test]
    fn out_of_bounds_ratio_follows_policy() {
        assert_eq!(
            engine().task_payout(200.0, 0.95, 20.0),
            Err(ParamError::RatioOutOfBounds {
                r: 0.95,
                min: 0.5,
                max: 0.9
            })
        );
        let payout = clamping_engine().task_payout(200.0, 0.95, 20.0).unwrap();
        assert!(payout.r_clamped);
        assert_eq!(payout.r, 0.9);
        assert_relative_eq!(payout.amount, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn negative_amounts_follow_policy() {
        assert!(matches!(
            engine().salary_breakdown(-1.0, 0.7, 10.0),
            Err(ParamError::NegativeAmount {
                name: "base_salary",
                ..
            })
        ));
        let breakdown = clamping_engine().salary_breakdown(-1.0, 0.7, 1000.0).unwrap();
        assert_eq!(breakdown.base, 0.0);
        assert!(engine().task_payout(f64::NAN, 0.7, 1.0).is_err());
        assert!(clamping_engine().task_payout(f64::NAN, 0.7, 1.0).is_err());
    }

    #[test]
    fn qc_settlement_reference_case() {
        let settlement = engine().qc_settlement(1000.0, 0.8, 2, &[2.0]).unwrap();
        assert_relative_eq!(settlement.params.worker_baseline, 700.0, epsilon = 1e-9);
        assert!(settlement.breakdown.normalized);
        assert!(!settlement.withheld);
        assert_relative_eq!(settlement.qc_amount, 254.607, epsilon = 1e-3);
        assert_eq!(settlement.entries.len(), 2);
        assert_eq!(settlement.entries[0].kind, PayoutKind::WorkerBaseline);
        assert_eq!(settlement.entries[1].role, PayoutRole::QualityControl);
    }

    #[test]
    fn qc_settlement_withholds_without_signal() {
        let settlement = engine().qc_settlement(1000.0, 0.8, 2, &[]).unwrap();
        assert!(settlement.withheld);
        assert_eq!(settlement.qc_amount, 0.0);
        assert_eq!(settlement.entries[1].amount_cents, 0);
        assert!(settlement.breakdown.payout > 0.0);
    }

    #[test]
    fn qc_review_weights_are_checked() {
        for weights in [[f64::NAN], [f64::INFINITY]] {
            assert!(matches!(
                engine().qc_settlement(1000.0, 0.8, 2, &weights),
                Err(ParamError::NonFinite { .. })
            ));
            assert!(clamping_engine()
                .qc_settlement(1000.0, 0.8, 2, &weights)
                .is_err());
        }
        assert!(matches!(
            engine().qc_settlement(1000.0, 0.8, 2, &[-2.0]),
            Err(ParamError::NegativeAmount {
                name: "review_weight",
                ..
            })
        ));
        // a negative review clamps to no review at all
        let settlement = clamping_engine()
            .qc_settlement(1000.0, 0.8, 2, &[-2.0])
            .unwrap();
        assert_eq!(settlement.effective_sample_size, 0.0);
        assert!(settlement.withheld);
        assert_eq!(settlement.qc_amount, 0.0);
    }

    #[test]
    fn qc_confidence_out_of_range_follows_policy() {
        assert!(matches!(
            engine().qc_settlement(1000.0, 1.3, 1, &[1.0]),
            Err(ParamError::RateOutOfRange { name: "p0", .. })
        ));
        let settlement = clamping_engine()
            .qc_settlement(1000.0, 1.3, 1, &[1.0])
            .unwrap();
        assert_eq!(settlement.params.p0, 1.0);
        assert!(clamping_engine()
            .qc_settlement(1000.0, f64::NAN, 1, &[1.0])
            .is_err());
        assert_relative_eq!(settlement.breakdown.raw_marginals[0], 250.0, epsilon = 1e-9);
    }

    #[test]
    fn qc_preview_uses_org_settings() {
        let preview = engine().qc_preview(1000.0, 0.8).unwrap();
        assert_relative_eq!(preview.first_marginal, 200.0, epsilon = 1e-9);
        assert_relative_eq!(preview.expected, 40.0 / 0.96, epsilon = 1e-9);
        assert_relative_eq!(preview.expected_after_rejection, 80.0 / 0.96, epsilon = 1e-9);
        assert!(engine().qc_preview(1000.0, -0.2).is_err());
        let clamped = clamping_engine().qc_preview(1000.0, -0.2).unwrap();
        assert_eq!(clamped.first_marginal, 0.0);
    }

    #[test]
    fn pm_settlement_and_pickup() {
        let settlement = engine().pm_settlement(10_000.0, 12_000.0, 0.0).unwrap();
        assert_eq!(settlement.payout.payout, 0.0);
        assert_relative_eq!(settlement.payout.breakdown.penalty, 1_500.0, epsilon = 1e-9);
        assert_eq!(settlement.entry.kind, PayoutKind::PmProfitShare);

        let bonus = engine().pm_pickup_bonus(1_000.0, 7.0).unwrap();
        assert_eq!(bonus.amount, 0.0);
        let bonus = engine().pm_pickup_bonus(1_000.0, 6.0).unwrap();
        assert!(bonus.amount > 0.0);
    }

    #[test]
    fn sales_settlement_conserves_pool() {
        let settlement = engine().sales_settlement(10_000.0, 7.0).unwrap();
        assert_relative_eq!(settlement.split.commission, 500.0, epsilon = 1e-9);
        assert_relative_eq!(settlement.split.pm_bonus_contribution, 500.0, epsilon = 1e-9);
        let cents: i64 = settlement.entries.iter().map(|e| e.amount_cents).sum();
        assert_eq!(cents, 100_000);
    }
}
