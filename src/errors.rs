//! Error types and validation functions for scaling analysis.
//!
//! This module provides the error handling shared by both estimators, covering
//! scale-window validation, degenerate regressions and scales whose coefficients
//! cannot support a log-moment or a normalized distribution.

use thiserror::Error;

/// Error types for scaling analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScalingAnalysisError {
    /// The regression window is outside the available scales or too short.
    #[error("Invalid scale window [{j1}, {j2}]: {reason}")]
    InvalidWindow {
        /// Lower bound of the requested window
        j1: i32,
        /// Upper bound of the requested window
        j2: i32,
        /// Why the window was rejected
        reason: String,
    },

    /// The regression slope is undefined (zero variance in the predictor).
    #[error("Degenerate regression: {reason}")]
    DegenerateRegression {
        /// Detailed reason for the failure
        reason: String,
    },

    /// The coefficients at a scale carry no mass for the given exponent, so the
    /// log-moment or the normalized distribution is undefined.
    #[error("Zero mass at scale {scale} for q = {q}")]
    ZeroMass {
        /// Scale at which the mass vanished
        scale: i32,
        /// Exponent that produced the zero mass
        q: f64,
    },

    /// A scale required by the computation has no coefficients.
    #[error("Scale {scale} has no coefficients")]
    EmptyScale {
        /// Offending scale
        scale: i32,
    },

    /// Invalid parameter value for estimator configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Insufficient data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Two inputs that must have matching lengths do not.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being compared
        what: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Numerical computation error (non-finite input or output).
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },
}

/// Result type for scaling analysis operations.
pub type ScalingResult<T> = Result<T, ScalingAnalysisError>;

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use fractal_scaling::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "p").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "p").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> ScalingResult<()> {
    if value.is_nan() {
        return Err(ScalingAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(ScalingAnalysisError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(ScalingAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value, reporting its index.
pub fn validate_all_finite(data: &[f64], name: &str) -> ScalingResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(ScalingAnalysisError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
            operation: None,
        });
    }

    Ok(())
}

/// Validates that two inputs have the same length.
pub fn validate_same_length(expected: usize, actual: usize, what: &str) -> ScalingResult<()> {
    if expected != actual {
        return Err(ScalingAnalysisError::DimensionMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parameter_valid_range() {
        assert!(validate_parameter(0.5, 0.0, 1.0, "p").is_ok());
        assert!(validate_parameter(0.0, 0.0, 1.0, "p").is_ok());
        assert!(validate_parameter(1.0, 0.0, 1.0, "p").is_ok());
    }

    #[test]
    fn test_validate_parameter_out_of_range() {
        match validate_parameter(1.5, 0.0, 1.0, "p") {
            Err(ScalingAnalysisError::InvalidParameter {
                parameter,
                value,
                constraint,
            }) => {
                assert_eq!(parameter, "p");
                assert_eq!(value, 1.5);
                assert_eq!(constraint, "[0, 1]");
            }
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_parameter_nan_inputs() {
        assert!(matches!(
            validate_parameter(f64::NAN, 0.0, 1.0, "p"),
            Err(ScalingAnalysisError::InvalidParameter { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, f64::NAN, 1.0, "p"),
            Err(ScalingAnalysisError::NumericalError { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, 1.0, 0.0, "p"),
            Err(ScalingAnalysisError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        assert!(validate_all_finite(&[], "empty").is_ok());
        assert!(validate_all_finite(&[1.0, 2.0], "ok").is_ok());

        match validate_all_finite(&[1.0, 2.0, f64::NAN], "coefficients") {
            Err(ScalingAnalysisError::NumericalError { reason, .. }) => {
                assert!(reason.contains("coefficients"));
                assert!(reason.contains("index 2"));
                assert!(reason.contains("NaN"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_same_length() {
        assert!(validate_same_length(3, 3, "weights").is_ok());
        assert_eq!(
            validate_same_length(3, 2, "weights"),
            Err(ScalingAnalysisError::DimensionMismatch {
                what: "weights".to_string(),
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_error_display_formatting() {
        let err = ScalingAnalysisError::InvalidWindow {
            j1: 3,
            j2: 3,
            reason: "need at least two scales".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("[3, 3]"));
        assert!(msg.contains("two scales"));

        let err = ScalingAnalysisError::ZeroMass { scale: 4, q: 1.0 };
        assert_eq!(format!("{}", err), "Zero mass at scale 4 for q = 1");

        let err = ScalingAnalysisError::EmptyScale { scale: 2 };
        assert_eq!(format!("{}", err), "Scale 2 has no coefficients");
    }
}
