//! # Fractal Scaling
//!
//! Estimation of multifractal scaling exponents from precomputed
//! multi-resolution coefficients (wavelet coefficients, wavelet leaders or
//! p-leaders organized by dyadic scale).
//!
//! Two estimators share the same input and numerical primitives:
//!
//! - **Structure functions**: per-scale absolute moments `S(j, q)` and the
//!   scaling function ζ(q), the log2-log2 slope of `S(j, q)` across scales
//! - **Multifractal spectrum**: weighted-entropy statistics `U(j, q)`,
//!   `V(j, q)` and the Legendre pair `(h(q), D(q))`
//!
//! ## Quick Start
//!
//! ```rust
//! use fractal_scaling::{
//!     EstimatorConfig, Formalism, MultifractalSpectrum, ScaleCoefficients, StructureFunction,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Coefficients whose magnitude grows like 2^(0.5 j).
//!     let mrq = ScaleCoefficients::from_scales(
//!         "example",
//!         Formalism::WaveletLeaders,
//!         (1..=5).map(|j| (j, vec![2f64.powf(0.5 * j as f64); 1usize << (7 - j)])),
//!     )?;
//!
//!     let config = EstimatorConfig::new(vec![-2.0, 0.0, 2.0], 1, 5).with_weighted(true);
//!
//!     let sf = StructureFunction::new(&mrq, &config)?;
//!     assert!((sf.hurst().unwrap() - 0.5).abs() < 1e-10);
//!
//!     let spectrum = MultifractalSpectrum::new(&mrq, &config)?;
//!     for (h, d) in spectrum.spectrum() {
//!         println!("h = {:.3}, D = {:.3}", h, d);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Numerical conventions
//!
//! - `0^0 = 1` and `0^q = 0` for `q != 0` (see [`math_utils::fast_power`])
//! - `0 · log2(0) = 0` in the entropy sums
//! - Scales whose log-moment or normalized distribution is undefined are
//!   reported as errors, never as NaN in a regression

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod math_utils;
pub mod multires;

// Estimators
pub mod analyzer;
pub mod mfspectrum;
pub mod structure_function;

// Synthetic data
pub mod generators;

pub use analyzer::{analyze_scaling, MaybeSync, ScalingAnalysis};
pub use config::{DegenerateScalePolicy, EstimatorConfig};
pub use errors::{ScalingAnalysisError, ScalingResult};
pub use math_utils::{fast_power, linear_regression, power_scalar};
pub use mfspectrum::MultifractalSpectrum;
pub use multires::{Formalism, MultiResolutionQuantity, ScaleCoefficients};
pub use structure_function::StructureFunction;

pub use generators::{
    binomial_cascade_dq, binomial_cascade_hq, binomial_cascade_quantity, generate_iid_quantity,
    generate_monofractal_quantity, GeneratorConfig,
};
