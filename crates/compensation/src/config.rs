use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::bounds::RBounds;
use crate::error::{check_at_least, check_non_negative, check_rate, ConfigError, ParamError};
use crate::pm_profit_share::{DEFAULT_OVERDRAFT_PENALTY, DEFAULT_PICKUP_BONUS_RATE};
use crate::qc_shapley::{
    DEFAULT_MAX_QC_PASSES, DEFAULT_RESUBMISSION_SUCCESS_PROBABILITY, DEFAULT_WORKER_BASELINE_RATIO,
};
use crate::salary::DEFAULT_MAX_URGENCY_MULTIPLIER;
use crate::sales_commission::DEFAULT_COMMISSION_DECAY_DAYS;

const RECOMMENDED_BETA: (f64, f64) = (0.15, 0.35);
const RECOMMENDED_GAMMA: (f64, f64) = (0.3, 0.6);

/// What the engine does with inputs outside their documented domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreconditionPolicy {
    /// Refuse the calculation with a [`ParamError`].
    #[default]
    Reject,
    /// Project inputs onto their domain and log the adjustment.
    Clamp,
}

/// Organization-level compensation settings.
///
/// Every field falls back to its default when absent from the TOML source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgCompensationParams {
    /// Salary/task ratio applied when an employee has none configured.
    pub default_r: f64,
    pub r_bounds: RBounds,
    pub qc_beta: f64,
    pub qc_gamma: f64,
    /// Project-manager profit-share rate.
    pub pm_x: f64,
    pub pm_overdraft_penalty: f64,
    pub worker_baseline_ratio: f64,
    pub qc_max_passes: usize,
    pub resubmission_success_probability: f64,
    pub urgency_max_multiplier: f64,
    pub pickup_bonus_rate: f64,
    pub sales_commission_rate: f64,
    pub sales_decay_max_days: f64,
    /// Minimum review-panel ESS before QC pay is released.
    pub min_effective_reviews: f64,
    pub precondition_policy: PreconditionPolicy,
}

impl Default for OrgCompensationParams {
    fn default() -> Self {
        Self {
            default_r: 0.7,
            r_bounds: RBounds::default(),
            qc_beta: 0.25,
            qc_gamma: 0.4,
            pm_x: 0.5,
            pm_overdraft_penalty: DEFAULT_OVERDRAFT_PENALTY,
            worker_baseline_ratio: DEFAULT_WORKER_BASELINE_RATIO,
            qc_max_passes: DEFAULT_MAX_QC_PASSES,
            resubmission_success_probability: DEFAULT_RESUBMISSION_SUCCESS_PROBABILITY,
            urgency_max_multiplier: DEFAULT_MAX_URGENCY_MULTIPLIER,
            pickup_bonus_rate: DEFAULT_PICKUP_BONUS_RATE,
            sales_commission_rate: 0.1,
            sales_decay_max_days: DEFAULT_COMMISSION_DECAY_DAYS,
            min_effective_reviews: 1.0,
            precondition_policy: PreconditionPolicy::Reject,
        }
    }
}

impl OrgCompensationParams {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(input)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        self.r_bounds.validate()?;
        check_rate("default_r", self.default_r)?;
        if !self.r_bounds.contains(self.default_r) {
            return Err(ParamError::RatioOutOfBounds {
                r: self.default_r,
                min: self.r_bounds.min,
                max: self.r_bounds.max,
            });
        }
        check_rate("qc_beta", self.qc_beta)?;
        check_rate("qc_gamma", self.qc_gamma)?;
        check_rate("pm_x", self.pm_x)?;
        check_rate("worker_baseline_ratio", self.worker_baseline_ratio)?;
        check_rate(
            "resubmission_success_probability",
            self.resubmission_success_probability,
        )?;
        check_rate("sales_commission_rate", self.sales_commission_rate)?;
        check_at_least("pm_overdraft_penalty", self.pm_overdraft_penalty, 1.0)?;
        check_at_least("urgency_max_multiplier", self.urgency_max_multiplier, 1.0)?;
        check_at_least("qc_max_passes", self.qc_max_passes as f64, 1.0)?;
        check_non_negative("pickup_bonus_rate", self.pickup_bonus_rate)?;
        check_non_negative("sales_decay_max_days", self.sales_decay_max_days)?;
        check_non_negative("min_effective_reviews", self.min_effective_reviews)?;
        Ok(())
    }

    /// Advisory notes for settings outside the recommended tuning ranges.
    pub fn recommended_tuning_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(RECOMMENDED_BETA.0..=RECOMMENDED_BETA.1).contains(&self.qc_beta) {
            warnings.push(format!(
                "qc_beta {} outside recommended range [{}, {}]",
                self.qc_beta, RECOMMENDED_BETA.0, RECOMMENDED_BETA.1
            ));
        }
        if !(RECOMMENDED_GAMMA.0..=RECOMMENDED_GAMMA.1).contains(&self.qc_gamma) {
            warnings.push(format!(
                "qc_gamma {} outside recommended range [{}, {}]",
                self.qc_gamma, RECOMMENDED_GAMMA.0, RECOMMENDED_GAMMA.1
            ));
        }
        warnings
    }
}
