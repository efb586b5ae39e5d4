use thiserror::Error;

/// Precondition violations reported by checked evaluation.
///
/// The formula functions themselves never produce these; they are raised by
/// `validate` helpers and by [`crate::PayoutEngine`] under
/// [`crate::config::PreconditionPolicy::Reject`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    NegativeAmount { name: &'static str, value: f64 },
    #[error("{name} must be at least {min}, got {value}")]
    BelowMinimum {
        name: &'static str,
        min: f64,
        value: f64,
    },
    #[error("worker baseline {v0} exceeds task value {value}")]
    BaselineExceedsValue { v0: f64, value: f64 },
    #[error("invalid ratio bounds: min {min} max {max}")]
    InvalidBounds { min: f64, max: f64 },
    #[error("ratio {r} outside configured bounds [{min}, {max}]")]
    RatioOutOfBounds { r: f64, min: f64, max: f64 },
    #[error("{name} is not a finite number")]
    NonFinite { name: &'static str },
}

/// Errors raised while loading organization configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ParamError),
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonFinite { name })
    }
}

pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<(), ParamError> {
    check_finite(name, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParamError::RateOutOfRange { name, value })
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), ParamError> {
    check_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParamError::NegativeAmount { name, value })
    }
}

pub(crate) fn check_at_least(name: &'static str, value: f64, min: f64) -> Result<(), ParamError> {
    check_finite(name, value)?;
    if value >= min {
        Ok(())
    } else {
        Err(ParamError::BelowMinimum { name, min, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_checks() {
        assert!(check_rate("gamma", 0.0).is_ok());
        assert!(check_rate("gamma", 1.0).is_ok());
        assert_eq!(
            check_rate("gamma", 1.2),
            Err(ParamError::RateOutOfRange {
                name: "gamma",
                value: 1.2
            })
        );
        assert_eq!(
            check_rate("p0", f64::NAN),
            Err(ParamError::NonFinite { name: "p0" })
        );
    }

    #[test]
    fn error_messages() {
        let err = ParamError::BaselineExceedsValue {
            v0: 800.0,
            value: 500.0,
        };
        assert_eq!(err.to_string(), "worker baseline 800 exceeds task value 500");
        assert!(check_non_negative("spent", -1.0).is_err());
        assert!(check_at_least("max_multiplier", 0.9, 1.0).is_err());
    }
}
