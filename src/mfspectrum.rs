//! Multifractal spectrum estimation via weighted-entropy statistics.
//!
//! For each scale j and exponent q, the coefficients define a normalized
//! power-weighted distribution
//!
//! ```text
//! R(j, q)_k = |c(j, k)|^q / Σ_i |c(j, i)|^q
//! ```
//!
//! from which two statistics are formed:
//!
//! ```text
//! V(j, q) = Σ_k R_k log2 |c(j, k)|
//! U(j, q) = log2 n_j + Σ_k R_k log2 R_k
//! ```
//!
//! Linear fits of U and V against j over `[j1, j2]` give the Legendre pair
//! `D(q) = 1 + slope(U)` and `h(q) = slope(V)`.
//!
//! Reference: H. Wendt (2008), *Contributions of Wavelet Leaders and Bootstrap
//! to Multifractal Analysis*, Ph.D. thesis, ENS Lyon, eqs. 2.74-2.78.

use crate::config::EstimatorConfig;
use crate::errors::{ScalingAnalysisError, ScalingResult};
use crate::math_utils::{fast_power, linear_regression, try_map_exponents};
use crate::multires::{absolute_coefficients, Formalism, MultiResolutionQuantity};
use nalgebra::DMatrix;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multifractal spectrum (D(q), h(q)) of a multi-resolution quantity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultifractalSpectrum {
    name: String,
    formalism: Formalism,
    q: Vec<f64>,
    scales: Vec<i32>,
    j1: i32,
    j2: i32,
    weighted: bool,
    /// U(j, q), shape (n_scales, n_q)
    u: DMatrix<f64>,
    /// V(j, q), shape (n_scales, n_q)
    v: DMatrix<f64>,
    dq: Vec<f64>,
    hq: Vec<f64>,
}

impl MultifractalSpectrum {
    /// Compute U(j, q), V(j, q) over every available scale and fit D(q), h(q)
    /// over the configured window.
    ///
    /// # Errors
    /// - `InvalidWindow` if `[j1, j2]` is not a contiguous range of available scales
    /// - `EmptyScale` for a scale without coefficients
    /// - `ZeroMass` if every coefficient at a scale is zero, or a zero
    ///   coefficient carries probability mass (q = 0 with exact zeros)
    /// - `DegenerateRegression` if the window weights leave a slope undefined
    pub fn new<M>(mrq: &M, config: &EstimatorConfig) -> ScalingResult<Self>
    where
        M: MultiResolutionQuantity + ?Sized,
    {
        let scales = mrq.scales();
        let window = config.window_indices(&scales)?;
        let n_q = config.q.len();

        log::debug!(
            "Multifractal spectrum for '{}' ({}): {} exponents, {} scales, window [{}, {}]",
            mrq.name(),
            mrq.formalism(),
            n_q,
            scales.len(),
            config.j1,
            config.j2
        );

        let mut u = DMatrix::from_element(scales.len(), n_q, f64::NAN);
        let mut v = DMatrix::from_element(scales.len(), n_q, f64::NAN);

        for (ind_j, &j) in scales.iter().enumerate() {
            let abs_coefs = match absolute_coefficients(mrq, j)? {
                Some(c) => c,
                None => {
                    config.check_degenerate(j, ScalingAnalysisError::EmptyScale { scale: j })?;
                    continue;
                }
            };

            let stats = try_map_exponents(&config.q, |qq| {
                match entropy_statistics(&abs_coefs, j, qq) {
                    Ok(uv) => Ok(Some(uv)),
                    Err(e) => config.check_degenerate(j, e).map(|_| None),
                }
            })?;

            for (ind_q, uv) in stats.into_iter().enumerate() {
                if let Some((u_jq, v_jq)) = uv {
                    u[(ind_j, ind_q)] = u_jq;
                    v[(ind_j, ind_q)] = v_jq;
                }
            }
        }

        let (x, weights) = config.regression_design(mrq)?;
        let mut dq = Vec::with_capacity(n_q);
        let mut hq = Vec::with_capacity(n_q);

        for ind_q in 0..n_q {
            let y: Vec<f64> = window.clone().map(|ind_j| u[(ind_j, ind_q)]).collect();
            let z: Vec<f64> = window.clone().map(|ind_j| v[(ind_j, ind_q)]).collect();

            let (slope_u, _) = linear_regression(&x, &y, weights.as_deref())?;
            let (slope_v, _) = linear_regression(&x, &z, weights.as_deref())?;

            dq.push(1.0 + slope_u);
            hq.push(slope_v);
        }

        Ok(Self {
            name: mrq.name().to_string(),
            formalism: mrq.formalism(),
            q: config.q.clone(),
            scales,
            j1: config.j1,
            j2: config.j2,
            weighted: config.weighted,
            u,
            v,
            dq,
            hq,
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

    /// Scales j, in the row order of [`u`](Self::u) and [`v`](Self::v).
    pub fn scales(&self) -> &[i32] {
        &self.scales
    }

    /// Regression window `(j1, j2)`.
    pub fn window(&self) -> (i32, i32) {
        (self.j1, self.j2)
    }

    /// Whether the fits used interval weights.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// U(j, q) with rows indexed by scale and columns by q.
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    /// V(j, q), same layout as [`u`](Self::u).
    pub fn v(&self) -> &DMatrix<f64> {
        &self.v
    }

    /// Fractal dimensions D(q).
    pub fn dq(&self) -> &[f64] {
        &self.dq
    }

    /// Hölder exponents h(q).
    pub fn hq(&self) -> &[f64] {
        &self.hq
    }

    /// Spectrum points `(h(q), D(q))`, in q order.
    pub fn spectrum(&self) -> Vec<(f64, f64)> {
        self.hq.iter().copied().zip(self.dq.iter().copied()).collect()
    }
}

/// `(U(j, q), V(j, q))` for the absolute coefficients of one scale.
///
/// R is invariant to a common rescaling of the coefficients, so magnitudes are
/// taken relative to a reference coefficient before raising them to q: the
/// largest one for q >= 0, the smallest non-zero one for q < 0. Every relative
/// term is then at most 1 and the reference term is exactly 1, so the mass
/// neither overflows nor underflows.
fn entropy_statistics(abs_coefs: &[f64], j: i32, q: f64) -> ScalingResult<(f64, f64)> {
    let nonzero = abs_coefs.iter().copied().filter(|&m| m > 0.0);
    let reference = if q < 0.0 {
        nonzero.fold(f64::INFINITY, f64::min)
    } else {
        nonzero.fold(0.0, f64::max)
    };
    if reference == 0.0 || reference.is_infinite() {
        return Err(ScalingAnalysisError::ZeroMass { scale: j, q });
    }

    let relative: Vec<f64> = abs_coefs.iter().map(|&m| m / reference).collect();
    let t = fast_power(&relative, q);
    let mass: f64 = t.iter().sum();
    let log_reference = reference.log2();

    let mut v = 0.0;
    let mut neg_entropy = 0.0;
    for (&m, &tk) in abs_coefs.iter().zip(&t) {
        let r = tk / mass;
        // 0 · log2(0) = 0
        if r == 0.0 {
            continue;
        }
        if m == 0.0 {
            return Err(ScalingAnalysisError::ZeroMass { scale: j, q });
        }
        v += r * (m.log2() - log_reference);
        neg_entropy += r * r.log2();
    }

    let u = (abs_coefs.len() as f64).log2() + neg_entropy;
    Ok((u, log_reference + v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DegenerateScalePolicy;
    use crate::multires::ScaleCoefficients;
    use assert_approx_eq::assert_approx_eq;

    /// Constant magnitude 2^(h·j) at every position of every scale.
    fn monofractal_quantity(h: f64, n_scales: i32) -> ScaleCoefficients {
        ScaleCoefficients::from_scales(
            "monofractal",
            Formalism::WaveletLeaders,
            (1..=n_scales).map(|j| {
                let count = 1usize << (n_scales - j + 2);
                (j, vec![2f64.powf(h * j as f64); count])
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_entropy_statistics_uniform_distribution() {
        let (u, v) = entropy_statistics(&[4.0; 8], 1, 2.0).unwrap();
        assert_approx_eq!(u, 0.0, 1e-12);
        assert_approx_eq!(v, 2.0, 1e-12);
    }

    #[test]
    fn test_entropy_statistics_point_mass() {
        // q = 1 on [0, 0, 0, 5]: all mass on one coefficient, zeros carry none.
        let (u, v) = entropy_statistics(&[0.0, 0.0, 0.0, 5.0], 1, 1.0).unwrap();
        assert_approx_eq!(u, 2.0, 1e-12);
        assert_approx_eq!(v, 5f64.log2(), 1e-12);
    }

    #[test]
    fn test_entropy_statistics_zero_handling() {
        assert_eq!(
            entropy_statistics(&[0.0, 0.0], 3, 2.0),
            Err(ScalingAnalysisError::ZeroMass { scale: 3, q: 2.0 })
        );
        // q = 0 spreads mass onto the exact zero.
        assert_eq!(
            entropy_statistics(&[0.0, 1.0], 2, 0.0),
            Err(ScalingAnalysisError::ZeroMass { scale: 2, q: 0.0 })
        );
        // Negative q gives zeros no mass rather than infinite mass.
        let (u, v) = entropy_statistics(&[0.0, 2.0, 2.0], 1, -1.0).unwrap();
        assert_approx_eq!(u, 3f64.log2() - 1.0, 1e-12);
        assert_approx_eq!(v, 1.0, 1e-12);
    }

    #[test]
    fn test_spectrum_invariant_to_coefficient_magnitude() {
        let rescaled = |s: f64| {
            ScaleCoefficients::from_scales(
                "rescaled",
                Formalism::WaveletLeaders,
                (1..=4).map(|j| {
                    let jf = j as f64;
                    (j, vec![s * jf, s * 2.0 * jf, s * 3.0])
                }),
            )
            .unwrap()
        };
        let config = EstimatorConfig::new(vec![-5.0, 2.0], 1, 4);
        let reference = MultifractalSpectrum::new(&rescaled(1.0), &config).unwrap();

        for &s in &[1e-70, 1e160] {
            let spectrum = MultifractalSpectrum::new(&rescaled(s), &config).unwrap();
            for ind_q in 0..2 {
                assert_approx_eq!(spectrum.dq()[ind_q], reference.dq()[ind_q], 1e-9);
                assert_approx_eq!(spectrum.hq()[ind_q], reference.hq()[ind_q], 1e-9);
                for ind_j in 0..4 {
                    assert_approx_eq!(
                        spectrum.u()[(ind_j, ind_q)],
                        reference.u()[(ind_j, ind_q)],
                        1e-9
                    );
                    // V shifts by log2 of the common factor.
                    assert_approx_eq!(
                        spectrum.v()[(ind_j, ind_q)],
                        reference.v()[(ind_j, ind_q)] + s.log2(),
                        1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn test_entropy_statistics_extreme_exponents() {
        // Plain |c|^q would overflow (q = -40) or underflow (q = 40) here.
        let coefs = [1e-10, 2e-10, 4e-10, 8e-10];
        for &q in &[-40.0, 40.0] {
            let (u, v) = entropy_statistics(&coefs, 1, q).unwrap();
            assert!(u.is_finite() && v.is_finite());
        }
        let (_, v) = entropy_statistics(&coefs, 1, 40.0).unwrap();
        assert_approx_eq!(v, 8e-10f64.log2(), 1e-6);
    }

    #[test]
    fn test_exact_monofractal_spectrum() {
        let mrq = monofractal_quantity(0.4, 6);
        let config = EstimatorConfig::new(vec![-3.0, -1.0, 0.0, 1.0, 2.5], 1, 6);
        let spectrum = MultifractalSpectrum::new(&mrq, &config).unwrap();

        for ind_q in 0..config.q.len() {
            assert_approx_eq!(spectrum.dq()[ind_q], 1.0, 1e-10);
            assert_approx_eq!(spectrum.hq()[ind_q], 0.4, 1e-10);
        }
        assert_eq!(spectrum.u().shape(), (6, 5));
        assert_eq!(spectrum.spectrum().len(), 5);
    }

    #[test]
    fn test_all_zero_scale_is_rejected() {
        let mut mrq = monofractal_quantity(0.4, 4);
        mrq.insert_scale(2, vec![0.0; 8]).unwrap();
        let result = MultifractalSpectrum::new(&mrq, &EstimatorConfig::new(vec![1.0], 1, 4));
        assert_eq!(result, Err(ScalingAnalysisError::ZeroMass { scale: 2, q: 1.0 }));
    }

    #[test]
    fn test_single_point_window_is_rejected() {
        let mrq = monofractal_quantity(0.4, 4);
        let result = MultifractalSpectrum::new(&mrq, &EstimatorConfig::new(vec![1.0], 2, 2));
        assert!(matches!(result, Err(ScalingAnalysisError::InvalidWindow { .. })));
    }

    #[test]
    fn test_degenerate_scale_outside_window_tolerated() {
        let mut mrq = monofractal_quantity(0.4, 5);
        mrq.insert_scale(5, vec![0.0, 0.0]).unwrap();
        let config = EstimatorConfig::new(vec![1.0, 2.0], 1, 4)
            .with_degenerate_scales(DegenerateScalePolicy::AllowOutsideWindow);

        let spectrum = MultifractalSpectrum::new(&mrq, &config).unwrap();
        assert!(spectrum.u()[(4, 0)].is_nan());
        assert!(spectrum.v()[(4, 1)].is_nan());
        assert_approx_eq!(spectrum.hq()[0], 0.4, 1e-10);
    }

    #[test]
    fn test_accessors_carry_quantity_metadata() {
        let mrq = monofractal_quantity(0.2, 3);
        let config = EstimatorConfig::new(vec![2.0], 1, 3).with_weighted(true);
        let spectrum = MultifractalSpectrum::new(&mrq, &config).unwrap();
        assert_eq!(spectrum.name(), "monofractal");
        assert_eq!(spectrum.formalism(), Formalism::WaveletLeaders);
        assert_eq!(spectrum.scales(), &[1, 2, 3]);
        assert_eq!(spectrum.window(), (1, 3));
        assert!(spectrum.is_weighted());
        assert_eq!(spectrum.q(), &[2.0]);
    }
}
