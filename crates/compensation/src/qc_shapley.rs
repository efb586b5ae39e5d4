//! Quality-control review compensation.
//!
//! Each QC pass on a task earns a marginal share of the task value:
//!   d_1 = β × p_0 × V
//!   d_k = d_1 × γ^k            (k = 0-based pass index)
//!
//! The first marginal is weighted by the external confidence estimate `p_0`
//! and later passes decay geometrically. The whole series is capped so that
//! the worker baseline plus every potential QC marginal never exceeds `V`:
//!   if v_0 + Σ d_k > V:  α = (V − v_0) / Σ d_k,  d_k ← α × d_k
//!
//! Scaling is uniform, so the decay shape is preserved. The expectation
//! helpers price the series before outcomes are known, assuming a constant
//! resubmission success probability on every pass after the first.

use serde::{Deserialize, Serialize};

use crate::error::{check_finite, check_non_negative, check_rate, ParamError};
use crate::money::Money;

/// Marginal series length used when the caller does not choose one.
pub const DEFAULT_MAX_QC_PASSES: usize = 5;

/// Probability that a resubmission passes review, used by the expectations.
pub const DEFAULT_RESUBMISSION_SUCCESS_PROBABILITY: f64 = 0.9;

/// Share of task value guaranteed to the worker before QC marginals.
pub const DEFAULT_WORKER_BASELINE_RATIO: f64 = 0.7;

pub const PEER_REVIEW_WEIGHT: f64 = 1.0;
pub const INDEPENDENT_REVIEW_WEIGHT: f64 = 2.0;

/// Inputs for one task's QC settlement.
///
/// Preconditions (unchecked by the formulas, see [`ShapleyParams::validate`]):
/// `worker_baseline <= task_value` and `p0`, `beta`, `gamma` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapleyParams {
    /// Total task value `V`.
    pub task_value: Money,
    /// Worker's guaranteed portion `v_0` of `V`.
    pub worker_baseline: Money,
    /// Model confidence for the first pass.
    pub p0: f64,
    /// Weight of the first marginal.
    pub beta: f64,
    /// Per-pass geometric decay.
    pub gamma: f64,
    /// Passes actually consumed (rejections plus final approval).
    pub passes: u32,
}

impl ShapleyParams {
    pub fn new(
        task_value: Money,
        worker_baseline: Money,
        p0: f64,
        beta: f64,
        gamma: f64,
        passes: u32,
    ) -> Self {
        Self {
            task_value,
            worker_baseline,
            p0,
            beta,
            gamma,
            passes,
        }
    }

    /// First-pass marginal `d_1 = β × p_0 × V`.
    pub fn first_marginal(&self) -> Money {
        self.beta * self.p0 * self.task_value
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        check_non_negative("task_value", self.task_value)?;
        check_non_negative("worker_baseline", self.worker_baseline)?;
        check_rate("p0", self.p0)?;
        check_rate("beta", self.beta)?;
        check_rate("gamma", self.gamma)?;
        if self.worker_baseline > self.task_value {
            return Err(ParamError::BaselineExceedsValue {
                v0: self.worker_baseline,
                value: self.task_value,
            });
        }
        Ok(())
    }

    /// Project every field onto its documented domain.
    ///
    /// NaN rates collapse to zero; non-finite amounts must be rejected
    /// through [`ShapleyParams::validate`] instead.
    pub fn clamped(&self) -> Self {
        let task_value = self.task_value.max(0.0);
        Self {
            task_value,
            worker_baseline: self.worker_baseline.clamp(0.0, task_value),
            p0: clamp_rate(self.p0),
            beta: clamp_rate(self.beta),
            gamma: clamp_rate(self.gamma),
            passes: self.passes,
        }
    }
}

fn clamp_rate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Full account of one QC settlement, for previews and audit rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcPayoutBreakdown {
    /// Marginals before the budget cap.
    pub raw_marginals: Vec<Money>,
    /// Marginals after the budget cap.
    pub marginals: Vec<Money>,
    /// Uniform scale applied to the raw series; 1.0 when uncapped.
    pub alpha: f64,
    pub normalized: bool,
    pub passes_paid: usize,
    pub payout: Money,
    pub worker_baseline: Money,
    /// `V − v_0 − Σ marginals`; non-negative up to rounding.
    pub cap_headroom: Money,
}

fn raw_marginals(params: &ShapleyParams, max_passes: usize) -> Vec<Money> {
    // Successive products keep the computed series monotone for γ <= 1.
    std::iter::successors(Some(params.first_marginal()), |d| Some(d * params.gamma))
        .take(max_passes)
        .collect()
}

/// Scale factor that brings `v_0 + total` down to `V`, if the cap binds.
fn normalization_factor(params: &ShapleyParams, total: Money) -> Option<f64> {
    // A zero series has nothing to scale.
    if total <= 0.0 {
        return None;
    }
    if params.worker_baseline + total > params.task_value {
        Some((params.task_value - params.worker_baseline) / total)
    } else {
        None
    }
}

/// Per-pass marginals for `max_passes` passes, budget-capped.
///
/// Always returns exactly `max_passes` entries regardless of
/// `params.passes`; callers slice to the passes that happened.
pub fn compute_qc_marginals(params: &ShapleyParams, max_passes: usize) -> Vec<Money> {
    let mut marginals = raw_marginals(params, max_passes);
    let total: Money = marginals.iter().sum();
    if let Some(alpha) = normalization_factor(params, total) {
        for marginal in &mut marginals {
            *marginal *= alpha;
        }
    }
    marginals
}

/// Amount owed to QC reviewers across the passes in `params.passes`.
///
/// Passes beyond [`DEFAULT_MAX_QC_PASSES`] earn nothing.
pub fn calculate_qc_payout(params: &ShapleyParams) -> Money {
    compute_qc_marginals(params, DEFAULT_MAX_QC_PASSES)
        .iter()
        .take(params.passes as usize)
        .sum()
}

pub fn calculate_qc_breakdown(params: &ShapleyParams, max_passes: usize) -> QcPayoutBreakdown {
    let raw = raw_marginals(params, max_passes);
    let total: Money = raw.iter().sum();
    let (alpha, normalized) = match normalization_factor(params, total) {
        Some(alpha) => (alpha, true),
        None => (1.0, false),
    };
    let marginals: Vec<Money> = if normalized {
        raw.iter().map(|d| d * alpha).collect()
    } else {
        raw.clone()
    };
    let passes_paid = (params.passes as usize).min(max_passes);
    let payout = marginals.iter().take(passes_paid).sum();
    let capped_total: Money = marginals.iter().sum();
    QcPayoutBreakdown {
        raw_marginals: raw,
        marginals,
        alpha,
        normalized,
        passes_paid,
        payout,
        worker_baseline: params.worker_baseline,
        cap_headroom: params.task_value - params.worker_baseline - capped_total,
    }
}

/// Expected total QC contribution before the first pass is decided:
///   E = d_1 × (1 − p_0) / (1 − (1 − p_re) × γ)
///
/// A non-positive denominator only arises from out-of-range `gamma` or
/// `p_re`; the undiscounted `d_1 × (1 − p_0)` is returned instead.
pub fn expected_qc_payout(d1: Money, p0: f64, gamma: f64, p_re: f64) -> Money {
    let numerator = d1 * (1.0 - p0);
    let denominator = 1.0 - (1.0 - p_re) * gamma;
    if denominator <= 0.0 {
        return numerator;
    }
    numerator / denominator
}

/// Expected remaining QC cost after the first pass was rejected:
///   E = d_1 × γ / (1 − (1 − p_re) × γ)
pub fn expected_remaining_qc(d1: Money, gamma: f64, p_re: f64) -> Money {
    let d2 = d1 * gamma;
    let denominator = 1.0 - (1.0 - p_re) * gamma;
    if denominator <= 0.0 {
        return d2;
    }
    d2 / denominator
}

pub fn calculate_worker_baseline(task_value: Money, ratio: f64) -> Money {
    task_value * ratio
}

/// Kish effective sample size `(Σw)² / Σw²` of a weighted review panel.
///
/// Zero for an empty panel or all-zero weights.
pub fn calculate_effective_sample_size(weights: &[f64]) -> f64 {
    let (sum, sum_sq) = weights
        .iter()
        .fold((0.0, 0.0), |(sum, sum_sq), w| (sum + w, sum_sq + w * w));
    if sum_sq == 0.0 {
        return 0.0;
    }
    (sum * sum) / sum_sq
}

/// Origin of a review, which fixes its weight in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Peer,
    Independent,
}

impl ReviewKind {
    pub fn weight(self) -> f64 {
        match self {
            ReviewKind::Peer => PEER_REVIEW_WEIGHT,
            ReviewKind::Independent => INDEPENDENT_REVIEW_WEIGHT,
        }
    }
}

pub fn review_panel_ess(reviews: &[ReviewKind]) -> f64 {
    let weights: Vec<f64> = reviews.iter().map(|kind| kind.weight()).collect();
    calculate_effective_sample_size(&weights)
}

/// Whether a panel carries enough independent signal to release QC pay.
pub fn has_sufficient_signal(weights: &[f64], min_ess: f64) -> bool {
    calculate_effective_sample_size(weights) >= min_ess
}

/// Finite-input guard used by the engine before pricing previews.
pub(crate) fn check_preview_inputs(d1: Money, p0: f64, gamma: f64) -> Result<(), ParamError> {
    check_finite("d1", d1)?;
    check_rate("p0", p0)?;
    check_rate("gamma", gamma)
}
