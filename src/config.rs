//! # Estimator Configuration
//!
//! This module contains the configuration shared by the structure-function and
//! multifractal-spectrum estimators: the exponent set, the regression window
//! and how degenerate scales are treated.

use crate::errors::{validate_all_finite, validate_same_length, ScalingAnalysisError, ScalingResult};
use crate::multires::MultiResolutionQuantity;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How scales with no usable coefficients (empty, or zero mass for some q)
/// are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegenerateScalePolicy {
    /// Any degenerate scale fails the estimation (default)
    #[default]
    Reject,
    /// Degenerate scales outside the regression window are stored as NaN;
    /// inside the window they still fail the estimation
    AllowOutsideWindow,
}

/// Configuration for a scaling estimator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimatorConfig {
    /// Exponents q (may include 0, negative and non-integer values)
    pub q: Vec<f64>,
    /// Lower bound of the regression window (inclusive)
    pub j1: i32,
    /// Upper bound of the regression window (inclusive)
    pub j2: i32,
    /// Weight each scale by the quantity's interval weights
    pub weighted: bool,
    /// Treatment of degenerate scales
    pub degenerate_scales: DegenerateScalePolicy,
}

impl EstimatorConfig {
    /// Unweighted configuration with the strict degenerate-scale policy.
    pub fn new(q: Vec<f64>, j1: i32, j2: i32) -> Self {
        Self {
            q,
            j1,
            j2,
            weighted: false,
            degenerate_scales: DegenerateScalePolicy::Reject,
        }
    }

    /// Enable or disable weighted regression.
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    /// Set the degenerate-scale policy.
    pub fn with_degenerate_scales(mut self, policy: DegenerateScalePolicy) -> Self {
        self.degenerate_scales = policy;
        self
    }

    /// Check the configuration independently of any quantity.
    pub fn validate(&self) -> ScalingResult<()> {
        if self.q.is_empty() {
            return Err(ScalingAnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        validate_all_finite(&self.q, "q")?;

        if self.j1 < 1 {
            return Err(ScalingAnalysisError::InvalidWindow {
                j1: self.j1,
                j2: self.j2,
                reason: "j1 must be at least 1".to_string(),
            });
        }
        if self.j2 <= self.j1 {
            return Err(ScalingAnalysisError::InvalidWindow {
                j1: self.j1,
                j2: self.j2,
                reason: "need at least two scales (j2 >= j1 + 1)".to_string(),
            });
        }
        Ok(())
    }

    /// Whether scale `j` lies in the regression window.
    pub fn in_window(&self, j: i32) -> bool {
        (self.j1..=self.j2).contains(&j)
    }

    /// Locate the window within `scales` (ascending).
    ///
    /// Every integer scale in `[j1, j2]` must be present. Returns the index
    /// range of the window within `scales`.
    pub fn window_indices(&self, scales: &[i32]) -> ScalingResult<std::ops::Range<usize>> {
        self.validate()?;

        let start = scales
            .iter()
            .position(|&j| j == self.j1)
            .ok_or_else(|| self.window_error(scales, "j1 is not an available scale"))?;
        let end = scales
            .iter()
            .position(|&j| j == self.j2)
            .ok_or_else(|| self.window_error(scales, "j2 is not an available scale"))?;

        // Scales are ascending and unique, so a gap shows up as a short span.
        if end < start || end - start != (self.j2 - self.j1) as usize {
            return Err(self.window_error(scales, "window contains missing scales"));
        }

        Ok(start..end + 1)
    }

    /// Regression predictor (the window's scales) and optional weights.
    ///
    /// Weights come from the quantity's interval weights when `weighted` is
    /// set; `None` means uniform.
    pub fn regression_design<M>(&self, mrq: &M) -> ScalingResult<(Vec<f64>, Option<Vec<f64>>)>
    where
        M: MultiResolutionQuantity + ?Sized,
    {
        let x: Vec<f64> = (self.j1..=self.j2).map(f64::from).collect();
        if !self.weighted {
            return Ok((x, None));
        }

        let weights = mrq.weight_over_interval(self.j1, self.j2);
        validate_same_length(x.len(), weights.len(), "interval weights")?;
        if let Some(&bad) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(ScalingAnalysisError::InvalidParameter {
                parameter: "interval weight".to_string(),
                value: bad,
                constraint: "finite and >= 0".to_string(),
            });
        }
        Ok((x, Some(weights)))
    }

    /// Decide whether a degenerate scale fails the estimation.
    ///
    /// Returns `Err(error)` under [`DegenerateScalePolicy::Reject`] or when `j`
    /// lies in the regression window; otherwise logs and lets the caller
    /// store NaN for that scale.
    pub fn check_degenerate(&self, j: i32, error: ScalingAnalysisError) -> ScalingResult<()> {
        match self.degenerate_scales {
            DegenerateScalePolicy::AllowOutsideWindow if !self.in_window(j) => {
                log::warn!("Skipping degenerate scale {} outside regression window: {}", j, error);
                Ok(())
            }
            _ => Err(error),
        }
    }

    fn window_error(&self, scales: &[i32], reason: &str) -> ScalingAnalysisError {
        let available = match (scales.first(), scales.last()) {
            (Some(lo), Some(hi)) => format!("{} (available scales {}..={})", reason, lo, hi),
            _ => format!("{} (no scales available)", reason),
        };
        ScalingAnalysisError::InvalidWindow {
            j1: self.j1,
            j2: self.j2,
            reason: available,
        }
    }
}
