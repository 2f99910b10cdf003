//! Configuration validation errors and range checks

use thiserror::Error;

/// Errors detected while validating pipeline configuration.
///
/// These are startup failures: a pipeline is never constructed from a
/// configuration that produced one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value out of allowed range
    #[error("{key} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        key: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Thresholds that must be strictly increasing are not
    #[error("{lower_key} ({lower}) must be strictly less than {upper_key} ({upper})")]
    NotIncreasing {
        lower_key: &'static str,
        lower: f64,
        upper_key: &'static str,
        upper: f64,
    },

    /// Failure reading or deserialising configuration sources
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Check `min <= value <= max`
pub fn ensure_range(key: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons, so test for containment rather than exclusion
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        })
    }
}

/// Check `value > 0` (and finite)
pub fn ensure_positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        })
    }
}

/// Check `lower < upper`
pub fn ensure_increasing(
    lower_key: &'static str,
    lower: f64,
    upper_key: &'static str,
    upper: f64,
) -> Result<(), ConfigError> {
    if lower < upper {
        Ok(())
    } else {
        Err(ConfigError::NotIncreasing {
            lower_key,
            lower,
            upper_key,
            upper,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_inclusive() {
        assert!(ensure_range("risk_threshold", 0.0, 0.0, 1.0).is_ok());
        assert!(ensure_range("risk_threshold", 1.0, 0.0, 1.0).is_ok());
        assert!(ensure_range("risk_threshold", 1.01, 0.0, 1.0).is_err());
        assert!(ensure_range("risk_threshold", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_positive() {
        assert!(ensure_positive("fx", 700.0).is_ok());
        assert!(ensure_positive("fx", 0.0).is_err());
        assert!(ensure_positive("fx", f64::INFINITY).is_err());
    }

    #[test]
    fn test_increasing_message() {
        let err = ensure_increasing("danger_distance", 2.0, "warning_distance", 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "danger_distance (2) must be strictly less than warning_distance (2)"
        );
    }
}
