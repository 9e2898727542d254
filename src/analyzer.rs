//! Combined scaling analysis of a single multi-resolution quantity.
//!
//! Runs the structure-function and multifractal-spectrum estimators with one
//! configuration. The two estimators only read the quantity, so with the
//! `parallel` feature they run concurrently.

use crate::config::EstimatorConfig;
use crate::errors::ScalingResult;
use crate::mfspectrum::MultifractalSpectrum;
use crate::multires::MultiResolutionQuantity;
use crate::structure_function::StructureFunction;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thread-safety required of quantities passed to [`analyze_scaling`].
///
/// With the `parallel` feature the two estimators share the quantity across
/// threads, so it must be `Sync`.
#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}

#[cfg(feature = "parallel")]
impl<T: Sync + ?Sized> MaybeSync for T {}

/// Thread-safety required of quantities passed to [`analyze_scaling`].
///
/// Sequential builds place no requirement on the quantity.
#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}

#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}

/// Results of both estimators on the same quantity and configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalingAnalysis {
    /// Structure functions and ζ(q)
    pub structure_function: StructureFunction,
    /// U, V and the (h(q), D(q)) spectrum
    pub spectrum: MultifractalSpectrum,
}

impl ScalingAnalysis {
    /// ζ(2) / 2 if q = 2 was requested.
    pub fn hurst(&self) -> Option<f64> {
        self.structure_function.hurst()
    }

    /// Width `max h(q) - min h(q)` of the spectrum, a simple multifractality
    /// indicator (0 for a monofractal).
    pub fn spectrum_width(&self) -> f64 {
        let hq = self.spectrum.hq();
        let max = hq.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = hq.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    }
}

/// Run both estimators on `mrq` with `config`.
///
/// Fails with the first estimator error; no partial result is returned.
/// The quantity must be `Sync` only when the `parallel` feature is enabled.
pub fn analyze_scaling<M>(mrq: &M, config: &EstimatorConfig) -> ScalingResult<ScalingAnalysis>
where
    M: MultiResolutionQuantity + MaybeSync + ?Sized,
{
    #[cfg(feature = "parallel")]
    let (structure_function, spectrum) = rayon::join(
        || StructureFunction::new(mrq, config),
        || MultifractalSpectrum::new(mrq, config),
    );

    #[cfg(not(feature = "parallel"))]
    let (structure_function, spectrum) = (
        StructureFunction::new(mrq, config),
        MultifractalSpectrum::new(mrq, config),
    );

    let analysis = ScalingAnalysis {
        structure_function: structure_function?,
        spectrum: spectrum?,
    };

    log::info!(
        "Scaling analysis of '{}': H = {:?}, spectrum width = {:.4}",
        mrq.name(),
        analysis.hurst(),
        analysis.spectrum_width()
    );

    Ok(analysis)
}
