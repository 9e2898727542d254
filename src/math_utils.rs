//! Numerical primitives shared by the scaling estimators.
//!
//! This module provides the zero-tolerant power operation used wherever
//! moments are computed and the weighted least-squares line fit used for
//! every scale-window regression.

use crate::errors::{validate_same_length, ScalingAnalysisError, ScalingResult};

/// Raise a single non-negative value to the real power `q`.
///
/// `q == 0` yields exactly 1, including for a zero base. A zero base with
/// `q != 0` yields exactly 0, so negative or fractional exponents never
/// produce infinities from exact zeros.
#[inline]
pub fn power_scalar(x: f64, q: f64) -> f64 {
    if q == 0.0 {
        1.0
    } else if x == 0.0 {
        0.0
    } else if q == 1.0 {
        x
    } else if q == 2.0 {
        x * x
    } else if q.fract() == 0.0 && q.abs() <= i32::MAX as f64 {
        x.powi(q as i32)
    } else {
        x.powf(q)
    }
}

/// Element-wise zero-tolerant power, see [`power_scalar`].
///
/// # Example
/// ```rust
/// use fractal_scaling::math_utils::fast_power;
///
/// assert_eq!(fast_power(&[0.0, 2.0], -1.0), vec![0.0, 0.5]);
/// assert_eq!(fast_power(&[0.0, 2.0], 0.0), vec![1.0, 1.0]);
/// ```
pub fn fast_power(x: &[f64], q: f64) -> Vec<f64> {
    x.iter().map(|&xi| power_scalar(xi, q)).collect()
}

/// Weighted least-squares line fit.
///
/// Minimizes `Σ w_i (y_i - slope·x_i - intercept)²` using centered weighted
/// moments. Passing `None` for the weights is the uniform case and goes
/// through the same arithmetic as an explicit vector of ones.
///
/// # Returns
/// `(slope, intercept)`
///
/// # Errors
/// - `InsufficientData` for fewer than two points
/// - `DimensionMismatch` if `x`, `y` and `weights` differ in length
/// - `NumericalError` for non-finite inputs or negative/non-finite weights
/// - `DegenerateRegression` if the weights sum to zero or the weighted
///   variance of `x` vanishes
///
/// # Example
/// ```rust
/// use fractal_scaling::math_utils::linear_regression;
///
/// let x = [1.0, 2.0, 3.0];
/// let y = [3.0, 5.0, 7.0];
/// let (slope, intercept) = linear_regression(&x, &y, None).unwrap();
/// assert!((slope - 2.0).abs() < 1e-12);
/// assert!((intercept - 1.0).abs() < 1e-12);
/// ```
pub fn linear_regression(
    x: &[f64],
    y: &[f64],
    weights: Option<&[f64]>,
) -> ScalingResult<(f64, f64)> {
    match weights {
        Some(w) => weighted_fit(x, y, w),
        None => {
            let ones = vec![1.0; x.len()];
            weighted_fit(x, y, &ones)
        }
    }
}

fn weighted_fit(x: &[f64], y: &[f64], w: &[f64]) -> ScalingResult<(f64, f64)> {
    validate_same_length(x.len(), y.len(), "regression response")?;
    validate_same_length(x.len(), w.len(), "regression weights")?;

    if x.len() < 2 {
        return Err(ScalingAnalysisError::InsufficientData {
            required: 2,
            actual: x.len(),
        });
    }

    if !x.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(ScalingAnalysisError::NumericalError {
            reason: "Non-finite values in regression data".to_string(),
            operation: Some("linear_regression".to_string()),
        });
    }

    if !w.iter().all(|&v| v.is_finite() && v >= 0.0) {
        return Err(ScalingAnalysisError::NumericalError {
            reason: "Regression weights must be finite and non-negative".to_string(),
            operation: Some("linear_regression".to_string()),
        });
    }

    let weight_sum: f64 = w.iter().sum();
    if weight_sum <= 0.0 {
        return Err(ScalingAnalysisError::DegenerateRegression {
            reason: "regression weights sum to zero".to_string(),
        });
    }

    // Only points carrying weight constrain the slope.
    let mut weighted_x = x.iter().zip(w).filter(|(_, &wi)| wi > 0.0).map(|(&xi, _)| xi);
    if let Some(first) = weighted_x.next() {
        if weighted_x.all(|xi| xi == first) {
            return Err(ScalingAnalysisError::DegenerateRegression {
                reason: "all weighted scales share the same predictor value".to_string(),
            });
        }
    }

    // Center on the weighted means before forming second moments.
    let mean_x = x.iter().zip(w).map(|(xi, wi)| wi * xi).sum::<f64>() / weight_sum;
    let mean_y = y.iter().zip(w).map(|(yi, wi)| wi * yi).sum::<f64>() / weight_sum;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for ((xi, yi), wi) in x.iter().zip(y).zip(w) {
        let dx = xi - mean_x;
        sxx += wi * dx * dx;
        sxy += wi * dx * (yi - mean_y);
    }

    if sxx <= 0.0 {
        return Err(ScalingAnalysisError::DegenerateRegression {
            reason: "predictor has zero weighted variance".to_string(),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    if !slope.is_finite() || !intercept.is_finite() {
        return Err(ScalingAnalysisError::NumericalError {
            reason: "Non-finite regression coefficients computed".to_string(),
            operation: Some("linear_regression".to_string()),
        });
    }

    Ok((slope, intercept))
}

/// Apply a fallible per-exponent computation to every q, in order.
///
/// With the `parallel` feature the exponents are processed by rayon; the
/// output order and the first reported error do not depend on scheduling.
pub(crate) fn try_map_exponents<T, F>(q: &[f64], f: F) -> ScalingResult<Vec<T>>
where
    T: Send,
    F: Fn(f64) -> ScalingResult<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let results: Vec<ScalingResult<T>> = q.par_iter().map(|&qq| f(qq)).collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        q.iter().map(|&qq| f(qq)).collect()
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}
