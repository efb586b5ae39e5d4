//! Salary/task ratio bounds.
//!
//! Organizations configure the range of `r` (the guaranteed base share of an
//! employee's compensation). Out-of-range requests are reported, never raised.

use serde::{Deserialize, Serialize};

use crate::error::{check_rate, ParamError};

/// Inclusive organization bounds on the salary/task ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for RBounds {
    fn default() -> Self {
        Self { min: 0.5, max: 0.9 }
    }
}

impl RBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Requires `0 <= min <= max <= 1`.
    pub fn validate(&self) -> Result<(), ParamError> {
        check_rate("r_bounds.min", self.min)?;
        check_rate("r_bounds.max", self.max)?;
        if self.min > self.max {
            return Err(ParamError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, r: f64) -> bool {
        r >= self.min && r <= self.max
    }
}

/// Outcome of checking a requested ratio against [`RBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RValidation {
    pub valid: bool,
    /// The value callers must persist.
    pub clamped: f64,
}

/// Check `r` against `bounds`, returning validity and the clamped value.
pub fn validate_r(r: f64, bounds: &RBounds) -> RValidation {
    RValidation {
        valid: bounds.contains(r),
        clamped: bounds.max.min(bounds.min.max(r)),
    }
}
