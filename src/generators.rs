//! Synthetic multi-resolution quantities with known scaling behavior.
//!
//! These generators produce coefficient sets directly at each scale (no
//! transform is involved) and are used for validating the estimators:
//!
//! - i.i.d. coefficients, whose moments do not drift across scales
//! - a monofractal, `|c(j, k)| = 2^{jH} u_k` with `u_k ~ U[0.5, 1.5]`
//! - a deterministic binomial cascade, whose D(q) and h(q) are known in closed form

use crate::errors::{validate_parameter, ScalingAnalysisError, ScalingResult};
use crate::multires::{Formalism, ScaleCoefficients};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest number of dyadic levels a generator will build (2^24 coefficients).
const MAX_LEVELS: u32 = 24;

/// Configuration shared by the random generators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of scales, numbered 1..=n_scales
    pub n_scales: i32,
    /// Coefficients at the finest scale (halved at each coarser scale for
    /// the monofractal, constant for the i.i.d. generator)
    pub base_count: usize,
    /// Lower bound of the multiplicative noise
    pub low: f64,
    /// Upper bound of the multiplicative noise
    pub high: f64,
    /// Random seed for reproducible generation
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_scales: 6,
            base_count: 4096,
            low: 0.5,
            high: 1.5,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> ScalingResult<()> {
        validate_parameter(self.n_scales as f64, 1.0, MAX_LEVELS as f64, "n_scales")?;
        if self.base_count == 0 {
            return Err(ScalingAnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        validate_parameter(self.low, 0.0, f64::MAX, "low")?;
        validate_parameter(self.high, self.low, f64::MAX, "high")?;
        Ok(())
    }
}

/// i.i.d. coefficients `U[low, high)` with `base_count` coefficients at every scale.
pub fn generate_iid_quantity(config: &GeneratorConfig) -> ScalingResult<ScaleCoefficients> {
    config.validate()?;
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);

    let mut mrq = ScaleCoefficients::new("iid", Formalism::WaveletCoefs);
    for j in 1..=config.n_scales {
        let coefs = (0..config.base_count)
            .map(|_| sample_noise(&mut rng, config.low, config.high))
            .collect();
        mrq.insert_scale(j, coefs)?;
    }
    Ok(mrq)
}

/// Monofractal coefficients `2^{jH}·u` with `u ~ U[low, high)`.
///
/// Scale j holds `base_count / 2^(j-1)` coefficients (at least one), and
/// signs alternate so that the estimators' use of absolute values is exercised.
pub fn generate_monofractal_quantity(
    config: &GeneratorConfig,
    hurst: f64,
) -> ScalingResult<ScaleCoefficients> {
    config.validate()?;
    validate_parameter(hurst, -5.0, 5.0, "hurst")?;
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);

    let mut mrq = ScaleCoefficients::new("monofractal", Formalism::WaveletLeaders);
    for j in 1..=config.n_scales {
        let count = (config.base_count >> (j - 1)).max(1);
        let magnitude = 2f64.powf(hurst * j as f64);
        let coefs = (0..count)
            .map(|k| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * magnitude * sample_noise(&mut rng, config.low, config.high)
            })
            .collect();
        mrq.insert_scale(j, coefs)?;
    }
    Ok(mrq)
}

/// Masses of a deterministic binomial cascade with weight `p`.
///
/// Level n of the cascade splits every interval's mass into fractions `p`
/// and `1 - p`. Scale j holds the `2^(finest_level - j)` masses of level
/// `finest_level - j`, so coarser scales see fewer, larger masses.
pub fn binomial_cascade_quantity(
    p: f64,
    n_scales: i32,
    finest_level: u32,
) -> ScalingResult<ScaleCoefficients> {
    validate_parameter(p, 0.0, 1.0, "p")?;
    if p == 0.0 || p == 1.0 {
        return Err(ScalingAnalysisError::InvalidParameter {
            parameter: "p".to_string(),
            value: p,
            constraint: "(0, 1)".to_string(),
        });
    }
    validate_parameter(finest_level as f64, 2.0, MAX_LEVELS as f64, "finest_level")?;
    validate_parameter(n_scales as f64, 2.0, (finest_level - 1) as f64, "n_scales")?;

    let mut levels: Vec<Vec<f64>> = Vec::with_capacity(finest_level as usize + 1);
    levels.push(vec![1.0]);
    for n in 1..=finest_level as usize {
        let previous = &levels[n - 1];
        let next = previous
            .iter()
            .flat_map(|&m| [m * p, m * (1.0 - p)])
            .collect();
        levels.push(next);
    }

    let mut mrq = ScaleCoefficients::new("binomial cascade", Formalism::WaveletLeaders);
    for j in 1..=n_scales {
        let level = finest_level as usize - j as usize;
        mrq.insert_scale(j, levels[level].clone())?;
    }
    Ok(mrq)
}

/// Exact h(q) of [`binomial_cascade_quantity`].
pub fn binomial_cascade_hq(p: f64, q: f64) -> f64 {
    let (r, s) = cascade_fractions(p, q);
    -(r * p.log2() + s * (1.0 - p).log2())
}

/// Exact D(q) of [`binomial_cascade_quantity`] (binary entropy of the q-weighted fractions).
pub fn binomial_cascade_dq(p: f64, q: f64) -> f64 {
    let (r, s) = cascade_fractions(p, q);
    -(r * r.log2() + s * s.log2())
}

fn cascade_fractions(p: f64, q: f64) -> (f64, f64) {
    let a = p.powf(q);
    let b = (1.0 - p).powf(q);
    (a / (a + b), b / (a + b))
}

fn sample_noise(rng: &mut ChaCha20Rng, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
