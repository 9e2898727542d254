//! Structure functions and the scaling function ζ(q).
//!
//! For every scale j and exponent q the structure function is the q-th
//! absolute moment of the coefficients,
//!
//! ```text
//! S(j, q) = (1 / n_j) Σ_k |c(j, k)|^q
//! ```
//!
//! and the scaling function ζ(q) is the slope of `log2 S(j, q)` against j over
//! the regression window `[j1, j2]`.

use crate::config::EstimatorConfig;
use crate::errors::{ScalingAnalysisError, ScalingResult};
use crate::math_utils::{fast_power, linear_regression, mean, try_map_exponents};
use crate::multires::{absolute_coefficients, Formalism, MultiResolutionQuantity};
use nalgebra::DMatrix;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structure functions of a multi-resolution quantity and their power-law fit.
///
/// Built once by [`StructureFunction::new`] and immutable afterwards. Scales
/// tolerated under [`crate::DegenerateScalePolicy::AllowOutsideWindow`] hold
/// NaN in [`values`](Self::values) and [`logvalues`](Self::logvalues).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructureFunction {
    name: String,
    formalism: Formalism,
    q: Vec<f64>,
    scales: Vec<i32>,
    j1: i32,
    j2: i32,
    weighted: bool,
    /// S(j, q), shape (n_q, n_scales)
    values: DMatrix<f64>,
    /// log2 S(j, q), shape (n_q, n_scales)
    logvalues: DMatrix<f64>,
    zeta: Vec<f64>,
    intercept: Vec<f64>,
}

impl StructureFunction {
    /// Compute the structure functions over every available scale and fit
    /// ζ(q) over the configured window.
    ///
    /// # Errors
    /// - `InvalidWindow` if `[j1, j2]` is not a contiguous range of available scales
    /// - `EmptyScale` / `ZeroMass` for a scale whose log-moment is undefined
    /// - `DegenerateRegression` if the window weights leave the slope undefined
    pub fn new<M>(mrq: &M, config: &EstimatorConfig) -> ScalingResult<Self>
    where
        M: MultiResolutionQuantity + ?Sized,
    {
        let scales = mrq.scales();
        let window = config.window_indices(&scales)?;
        let n_q = config.q.len();

        log::debug!(
            "Structure functions for '{}' ({}): {} exponents, {} scales, window [{}, {}]",
            mrq.name(),
            mrq.formalism(),
            n_q,
            scales.len(),
            config.j1,
            config.j2
        );

        let mut values = DMatrix::from_element(n_q, scales.len(), f64::NAN);
        let mut logvalues = DMatrix::from_element(n_q, scales.len(), f64::NAN);

        for (ind_j, &j) in scales.iter().enumerate() {
            let abs_coefs = match absolute_coefficients(mrq, j)? {
                Some(c) => c,
                None => {
                    config.check_degenerate(j, ScalingAnalysisError::EmptyScale { scale: j })?;
                    continue;
                }
            };

            let moments = scale_moments(&abs_coefs, &config.q)?;

            for (ind_q, (&qq, &s)) in config.q.iter().zip(&moments).enumerate() {
                if s == 0.0 {
                    config.check_degenerate(j, ScalingAnalysisError::ZeroMass { scale: j, q: qq })?;
                    continue;
                }
                if !s.is_finite() {
                    config.check_degenerate(
                        j,
                        ScalingAnalysisError::NumericalError {
                            reason: format!("S(j={}, q={}) overflowed", j, qq),
                            operation: Some("structure_function".to_string()),
                        },
                    )?;
                    continue;
                }
                values[(ind_q, ind_j)] = s;
                logvalues[(ind_q, ind_j)] = s.log2();
            }
        }

        let (x, weights) = config.regression_design(mrq)?;
        let mut zeta = Vec::with_capacity(n_q);
        let mut intercept = Vec::with_capacity(n_q);

        for ind_q in 0..n_q {
            let y: Vec<f64> = window.clone().map(|ind_j| logvalues[(ind_q, ind_j)]).collect();
            let (slope, b) = linear_regression(&x, &y, weights.as_deref())?;
            zeta.push(slope);
            intercept.push(b);
        }

        Ok(Self {
            name: mrq.name().to_string(),
            formalism: mrq.formalism(),
            q: config.q.clone(),
            scales,
            j1: config.j1,
            j2: config.j2,
            weighted: config.weighted,
            values,
            logvalues,
            zeta,
            intercept,
        })
    }

    /// Name of the analyzed signal.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formalism of the analyzed coefficients.
    pub fn formalism(&self) -> Formalism {
        self.formalism
    }

    /// Exponents q, in configuration order.
    pub fn q(&self) -> &[f64] {
        &self.q
    }

    /// Scales j, in the column order of [`values`](Self::values).
    pub fn scales(&self) -> &[i32] {
        &self.scales
    }

    /// Regression window `(j1, j2)`.
    pub fn window(&self) -> (i32, i32) {
        (self.j1, self.j2)
    }

    /// Whether the fit used interval weights.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// S(j, q) with rows indexed by q and columns by scale.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// log2 S(j, q), same layout as [`values`](Self::values).
    pub fn logvalues(&self) -> &DMatrix<f64> {
        &self.logvalues
    }

    /// Scaling function ζ(q).
    pub fn zeta(&self) -> &[f64] {
        &self.zeta
    }

    /// Intercepts of the log2 S(j, q) fits.
    pub fn intercepts(&self) -> &[f64] {
        &self.intercept
    }

    /// Hurst-like exponent ζ(2) / 2, `None` if q = 2 was not requested.
    pub fn hurst(&self) -> Option<f64> {
        self.q2_index().map(|i| self.zeta[i] / 2.0)
    }

    /// Intercept of the q = 2 fit, `None` if q = 2 was not requested.
    pub fn intercept_at_q2(&self) -> Option<f64> {
        self.q2_index().map(|i| self.intercept[i])
    }

    /// `(q, ζ(q))` pairs.
    pub fn scaling_function(&self) -> Vec<(f64, f64)> {
        self.q.iter().copied().zip(self.zeta.iter().copied()).collect()
    }

    /// End points `((j1, y1), (j2, y2))` of the fitted line for exponent `ind_q`.
    pub fn regression_line(&self, ind_q: usize) -> Option<((f64, f64), (f64, f64))> {
        let slope = *self.zeta.get(ind_q)?;
        let b = self.intercept[ind_q];
        let (x0, x1) = (f64::from(self.j1), f64::from(self.j2));
        Some(((x0, slope * x0 + b), (x1, slope * x1 + b)))
    }

    fn q2_index(&self) -> Option<usize> {
        self.q.iter().position(|&qq| qq == 2.0)
    }
}

/// Mean of `|c|^q` at one scale for every exponent.
fn scale_moments(abs_coefs: &[f64], q: &[f64]) -> ScalingResult<Vec<f64>> {
    try_map_exponents(q, |qq| {
        mean(&fast_power(abs_coefs, qq)).ok_or(ScalingAnalysisError::InsufficientData {
            required: 1,
            actual: 0,
        })
    })
}
