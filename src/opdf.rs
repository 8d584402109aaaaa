//!
//! Observation probability distribution functions (opdf)
//!
//! Each hidden state of an HMM owns one opdf. The inference and learning
//! code only touches an opdf through the `Opdf` trait, so any family of
//! emission distribution can be plugged in.
//!
//! * `OpdfDiscrete`: finite alphabet of symbols `0..n_symbols`
//! * `OpdfGaussian`: univariate normal distribution
//! * `OpdfLogNormal`: univariate log-normal distribution
//! * `OpdfReal`: either Gaussian or log-normal, chosen at runtime
//!
pub mod discrete;
pub mod gaussian;
pub mod lognormal;
pub mod real;

pub use discrete::OpdfDiscrete;
pub use gaussian::OpdfGaussian;
pub use lognormal::OpdfLogNormal;
pub use real::OpdfReal;

use crate::common::Weight;
use crate::error::{HmmError, Result};
use crate::prob::Prob;
use rand::Rng;

///
/// Emission distribution of a hidden state.
///
/// `Clone` is the duplicate capability: learning algorithms clone the
/// opdfs of the old model before fitting them.
///
pub trait Opdf: Clone + std::fmt::Debug + std::fmt::Display {
    /// Type of a single observation emitted by the state
    type Observation: Clone + std::fmt::Debug;
    ///
    /// `log P(o)` (the log-density for continuous distributions)
    ///
    fn log_probability(&self, o: &Self::Observation) -> Prob;
    ///
    /// `P(o)` in linear space
    ///
    fn probability(&self, o: &Self::Observation) -> f64 {
        self.log_probability(o).to_value()
    }
    ///
    /// Check that the observation can be evaluated by this distribution.
    ///
    fn check(&self, _o: &Self::Observation) -> Result<()> {
        Ok(())
    }
    ///
    /// Re-estimate the parameters from weighted observations.
    ///
    /// `weights[i]` is the (linear, non-negative) weight of `observations[i]`.
    /// If all weights are zero, the distribution keeps its parameters.
    ///
    fn fit_weighted(&mut self, observations: &[Self::Observation], weights: &[Weight])
        -> Result<()>;
    ///
    /// Re-estimate the parameters giving every observation the same weight.
    ///
    fn fit(&mut self, observations: &[Self::Observation]) -> Result<()> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        let w = 1.0 / observations.len() as f64;
        let weights = vec![w; observations.len()];
        self.fit_weighted(observations, &weights)
    }
    ///
    /// Draw an observation
    ///
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Observation;
}

///
/// Common argument check of `Opdf::fit_weighted`.
/// Returns the sum of the weights.
///
pub(crate) fn check_weights<O>(observations: &[O], weights: &[Weight]) -> Result<f64> {
    if observations.is_empty() {
        return Err(HmmError::EmptySequence);
    }
    if observations.len() != weights.len() {
        return Err(HmmError::DimensionMismatch {
            what: "weights",
            expected: observations.len(),
            actual: weights.len(),
        });
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(HmmError::InvalidParameter(format!("weight {} is not allowed", w)));
    }
    Ok(weights.iter().sum())
}
