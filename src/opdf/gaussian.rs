//!
//! Univariate normal distribution
//!
use super::{check_weights, Opdf};
use crate::common::Weight;
use crate::error::{HmmError, Result};
use crate::prob::Prob;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

///
/// Variance never goes below this value when fitting, so that a cluster
/// of identical observations still gives a proper density.
///
pub const MIN_VARIANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpdfGaussian {
    mean: f64,
    variance: f64,
}

impl OpdfGaussian {
    ///
    /// `N(mean, variance)`. `variance` must be positive.
    ///
    pub fn new(mean: f64, variance: f64) -> Result<Self> {
        check_mean_variance(mean, variance)?;
        Ok(OpdfGaussian { mean, variance })
    }
    pub fn mean(&self) -> f64 {
        self.mean
    }
    pub fn variance(&self) -> f64 {
        self.variance
    }
}

/// `N(0, 1)`
impl Default for OpdfGaussian {
    fn default() -> Self {
        OpdfGaussian {
            mean: 0.0,
            variance: 1.0,
        }
    }
}

pub(crate) fn check_mean_variance(mean: f64, variance: f64) -> Result<()> {
    if !mean.is_finite() {
        return Err(HmmError::InvalidParameter(format!("mean {} is not finite", mean)));
    }
    if !(variance > 0.0) || !variance.is_finite() {
        return Err(HmmError::InvalidParameter(format!(
            "variance must be positive, got {}",
            variance
        )));
    }
    Ok(())
}

///
/// Weighted mean and variance of `xs`, with the weights normalized by `total`.
///
pub(crate) fn weighted_mean_variance<I>(xs: I, weights: &[Weight], total: f64) -> (f64, f64)
where
    I: Iterator<Item = f64> + Clone,
{
    let mean: f64 = xs.clone().zip(weights).map(|(x, w)| x * w).sum::<f64>() / total;
    let variance: f64 = xs
        .zip(weights)
        .map(|(x, w)| (x - mean) * (x - mean) * w)
        .sum::<f64>()
        / total;
    (mean, variance.max(MIN_VARIANCE))
}

impl Opdf for OpdfGaussian {
    type Observation = f64;

    ///
    /// ```text
    /// log N(x; m, v) = -1/2 (log(2 pi v) + (x - m)^2 / v)
    /// ```
    fn log_probability(&self, x: &f64) -> Prob {
        let d = x - self.mean;
        Prob::from_log_prob(-0.5 * ((2.0 * PI * self.variance).ln() + d * d / self.variance))
    }
    fn probability(&self, x: &f64) -> f64 {
        let d = x - self.mean;
        (-0.5 * d * d / self.variance).exp() / (2.0 * PI * self.variance).sqrt()
    }
    fn check(&self, x: &f64) -> Result<()> {
        if x.is_finite() {
            Ok(())
        } else {
            Err(HmmError::ObservationOutOfDomain(format!("{} is not finite", x)))
        }
    }
    fn fit_weighted(&mut self, observations: &[f64], weights: &[Weight]) -> Result<()> {
        let total = check_weights(observations, weights)?;
        for x in observations {
            self.check(x)?;
        }
        if total == 0.0 {
            return Ok(());
        }
        let (mean, variance) = weighted_mean_variance(observations.iter().copied(), weights, total);
        self.mean = mean;
        self.variance = variance;
        Ok(())
    }
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        self.mean + self.variance.sqrt() * z
    }
}

impl std::fmt::Display for OpdfGaussian {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Gaussian distribution --- Mean: {:.4} Variance {:.4}",
            self.mean, self.variance
        )
    }
}
