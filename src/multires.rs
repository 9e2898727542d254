//! Multi-resolution quantities consumed by the scaling estimators.
//!
//! The estimators never build wavelet coefficients or leaders themselves. They
//! read them through the [`MultiResolutionQuantity`] trait, which exposes the
//! per-scale coefficient arrays of an already computed decomposition.
//! [`ScaleCoefficients`] is a ready-made implementation keyed by scale.

use crate::errors::{validate_all_finite, validate_same_length, ScalingAnalysisError, ScalingResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of multi-resolution coefficients being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Formalism {
    /// Discrete wavelet coefficients
    WaveletCoefs,
    /// Wavelet leaders
    WaveletLeaders,
    /// Wavelet p-leaders
    WaveletPLeaders,
}

impl Formalism {
    /// Human-readable label used in reports and plot titles.
    pub fn label(&self) -> &'static str {
        match self {
            Formalism::WaveletCoefs => "wavelet coefs",
            Formalism::WaveletLeaders => "wavelet leaders",
            Formalism::WaveletPLeaders => "wavelet p-leaders",
        }
    }
}

impl fmt::Display for Formalism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only view of a multi-resolution decomposition organized by dyadic scale.
///
/// Implementations must return the scales in ascending order, and
/// `coefficients(j).len()` must equal `count(j)` for every listed scale.
/// Coefficients may be signed; the estimators use their absolute values.
pub trait MultiResolutionQuantity {
    /// Identifier of the analyzed signal.
    fn name(&self) -> &str;

    /// Which kind of coefficients this quantity holds.
    fn formalism(&self) -> Formalism;

    /// Available scales, ascending.
    fn scales(&self) -> Vec<i32>;

    /// Number of coefficients at scale `j` (0 for an unknown scale).
    fn count(&self, j: i32) -> usize;

    /// Coefficients at scale `j`, `None` for an unknown scale.
    fn coefficients(&self, j: i32) -> Option<&[f64]>;

    /// Non-negative regression weights for every scale in `[j1, j2]`.
    ///
    /// The default weights each scale by its coefficient count.
    fn weight_over_interval(&self, j1: i32, j2: i32) -> Vec<f64> {
        (j1..=j2).map(|j| self.count(j) as f64).collect()
    }
}

/// Per-scale coefficient arrays stored in an explicit scale-keyed map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleCoefficients {
    name: String,
    formalism: Formalism,
    values: BTreeMap<i32, Vec<f64>>,
}

impl ScaleCoefficients {
    /// Create an empty quantity.
    pub fn new(name: impl Into<String>, formalism: Formalism) -> Self {
        Self {
            name: name.into(),
            formalism,
            values: BTreeMap::new(),
        }
    }

    /// Build a quantity from `(scale, coefficients)` pairs.
    pub fn from_scales<I>(name: impl Into<String>, formalism: Formalism, scales: I) -> ScalingResult<Self>
    where
        I: IntoIterator<Item = (i32, Vec<f64>)>,
    {
        let mut mrq = Self::new(name, formalism);
        for (j, coefs) in scales {
            mrq.insert_scale(j, coefs)?;
        }
        Ok(mrq)
    }

    /// Insert (or replace) the coefficients of scale `j`.
    ///
    /// Scales must be at least 1 and coefficients finite. An empty array is
    /// accepted here; estimators reject it when they need that scale.
    pub fn insert_scale(&mut self, j: i32, coefficients: Vec<f64>) -> ScalingResult<()> {
        if j < 1 {
            return Err(ScalingAnalysisError::InvalidParameter {
                parameter: "scale".to_string(),
                value: j as f64,
                constraint: ">= 1".to_string(),
            });
        }
        validate_all_finite(&coefficients, &format!("coefficients at scale {}", j))?;
        self.values.insert(j, coefficients);
        Ok(())
    }

    /// Number of stored scales.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no scale has been inserted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(scale, coefficients)` in ascending scale order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[f64])> {
        self.values.iter().map(|(&j, v)| (j, v.as_slice()))
    }
}

impl MultiResolutionQuantity for ScaleCoefficients {
    fn name(&self) -> &str {
        &self.name
    }

    fn formalism(&self) -> Formalism {
        self.formalism
    }

    fn scales(&self) -> Vec<i32> {
        self.values.keys().copied().collect()
    }

    fn count(&self, j: i32) -> usize {
        self.values.get(&j).map_or(0, Vec::len)
    }

    fn coefficients(&self, j: i32) -> Option<&[f64]> {
        self.values.get(&j).map(Vec::as_slice)
    }
}

/// Absolute values of the coefficients at scale `j`.
///
/// Returns `None` for a missing or empty scale. Fails if the reported count
/// disagrees with the coefficient array or a coefficient is not finite.
pub(crate) fn absolute_coefficients<M>(mrq: &M, j: i32) -> ScalingResult<Option<Vec<f64>>>
where
    M: MultiResolutionQuantity + ?Sized,
{
    let coefs = match mrq.coefficients(j) {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(None),
    };
    validate_same_length(mrq.count(j), coefs.len(), &format!("coefficient count at scale {}", j))?;
    validate_all_finite(coefs, &format!("coefficients at scale {}", j))?;
    Ok(Some(coefs.iter().map(|c| c.abs()).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScaleCoefficients {
        ScaleCoefficients::from_scales(
            "sample",
            Formalism::WaveletLeaders,
            vec![(3, vec![1.0]), (1, vec![1.0, -2.0, 3.0, 4.0]), (2, vec![0.5, 0.5])],
        )
        .unwrap()
    }

    #[test]
    fn test_scales_are_ordered_regardless_of_insertion() {
        let mrq = sample();
        assert_eq!(mrq.scales(), vec![1, 2, 3]);
        assert_eq!(mrq.len(), 3);
        let order: Vec<i32> = mrq.iter().map(|(j, _)| j).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_counts_and_coefficients() {
        let mrq = sample();
        assert_eq!(mrq.count(1), 4);
        assert_eq!(mrq.count(2), 2);
        assert_eq!(mrq.count(9), 0);
        assert_eq!(mrq.coefficients(1), Some(&[1.0, -2.0, 3.0, 4.0][..]));
        assert_eq!(mrq.coefficients(9), None);
    }

    #[test]
    fn test_default_weights_are_counts() {
        let mrq = sample();
        assert_eq!(mrq.weight_over_interval(1, 3), vec![4.0, 2.0, 1.0]);
        assert_eq!(mrq.weight_over_interval(2, 3).len(), 2);
    }

    #[test]
    fn test_insert_rejects_bad_input() {
        let mut mrq = ScaleCoefficients::new("bad", Formalism::WaveletCoefs);
        assert!(matches!(
            mrq.insert_scale(0, vec![1.0]),
            Err(ScalingAnalysisError::InvalidParameter { .. })
        ));
        assert!(matches!(
            mrq.insert_scale(1, vec![1.0, f64::NAN]),
            Err(ScalingAnalysisError::NumericalError { .. })
        ));
        assert!(mrq.is_empty());
    }

    #[test]
    fn test_absolute_coefficients() {
        let mut mrq = sample();
        mrq.insert_scale(4, vec![]).unwrap();
        assert_eq!(
            absolute_coefficients(&mrq, 1).unwrap(),
            Some(vec![1.0, 2.0, 3.0, 4.0])
        );
        assert_eq!(absolute_coefficients(&mrq, 4).unwrap(), None);
        assert_eq!(absolute_coefficients(&mrq, 7).unwrap(), None);
    }

    /// Bypasses the finiteness check of `ScaleCoefficients::insert_scale`.
    struct RawQuantity(Vec<f64>);

    impl MultiResolutionQuantity for RawQuantity {
        fn name(&self) -> &str {
            "raw"
        }

        fn formalism(&self) -> Formalism {
            Formalism::WaveletCoefs
        }

        fn scales(&self) -> Vec<i32> {
            vec![1]
        }

        fn count(&self, j: i32) -> usize {
            if j == 1 {
                self.0.len()
            } else {
                0
            }
        }

        fn coefficients(&self, j: i32) -> Option<&[f64]> {
            (j == 1).then_some(self.0.as_slice())
        }
    }

    #[test]
    fn test_absolute_coefficients_rejects_non_finite() {
        let mrq = RawQuantity(vec![1.0, f64::NAN, 2.0]);
        match absolute_coefficients(&mrq, 1) {
            Err(ScalingAnalysisError::NumericalError { reason, .. }) => {
                assert!(reason.contains("coefficients at scale 1"));
                assert!(reason.contains("NaN"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }

        let mrq = RawQuantity(vec![f64::INFINITY]);
        assert!(matches!(
            absolute_coefficients(&mrq, 1),
            Err(ScalingAnalysisError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_formalism_labels() {
        assert_eq!(Formalism::WaveletCoefs.to_string(), "wavelet coefs");
        assert_eq!(Formalism::WaveletLeaders.label(), "wavelet leaders");
        assert_eq!(Formalism::WaveletPLeaders.label(), "wavelet p-leaders");
    }
}
