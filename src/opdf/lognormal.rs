//!
//! Univariate log-normal distribution
//!
//! `x` is log-normal with parameters `(mean, variance)` if `ln x` is normal
//! with the same mean and variance.
//!
use super::gaussian::{check_mean_variance, weighted_mean_variance};
use super::{check_weights, Opdf};
use crate::common::Weight;
use crate::error::{HmmError, Result};
use crate::prob::Prob;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpdfLogNormal {
    mean: f64,
    variance: f64,
}

impl OpdfLogNormal {
    ///
    /// Log-normal distribution whose logarithm has the given mean and
    /// (positive) variance.
    ///
    pub fn new(mean: f64, variance: f64) -> Result<Self> {
        check_mean_variance(mean, variance)?;
        Ok(OpdfLogNormal { mean, variance })
    }
    /// mean of `ln x`
    pub fn mean(&self) -> f64 {
        self.mean
    }
    /// variance of `ln x`
    pub fn variance(&self) -> f64 {
        self.variance
    }
    /// mean of `x`, `exp(m + v/2)`
    pub fn arithmetic_mean(&self) -> f64 {
        (self.mean + 0.5 * self.variance).exp()
    }
    /// variance of `x`, `(exp(v) - 1) exp(2m + v)`
    pub fn arithmetic_variance(&self) -> f64 {
        (self.variance.exp() - 1.0) * (2.0 * self.mean + self.variance).exp()
    }
}

impl Default for OpdfLogNormal {
    fn default() -> Self {
        OpdfLogNormal {
            mean: 0.0,
            variance: 1.0,
        }
    }
}

impl Opdf for OpdfLogNormal {
    type Observation = f64;

    ///
    /// ```text
    /// log f(x) = -1/2 ((ln x - m)^2 / v) - ln(sqrt(2 pi v)) - ln x   (x > 0)
    /// ```
    /// and `p = 0` for `x <= 0`.
    fn log_probability(&self, x: &f64) -> Prob {
        if *x <= 0.0 {
            return Prob::zero();
        }
        let ln_x = x.ln();
        let z = (ln_x - self.mean) / self.variance.sqrt();
        let ln_term = 0.5 * (2.0 * PI * self.variance).ln();
        Prob::from_log_prob(-0.5 * z * z - (ln_term + ln_x))
    }
    fn check(&self, x: &f64) -> Result<()> {
        if x.is_finite() && *x > 0.0 {
            Ok(())
        } else {
            Err(HmmError::ObservationOutOfDomain(format!(
                "log-normal observation must be positive and finite, got {}",
                x
            )))
        }
    }
    fn fit_weighted(&mut self, observations: &[f64], weights: &[Weight]) -> Result<()> {
        let total = check_weights(observations, weights)?;
        if let Some(x) = observations.iter().find(|&&x| !(x > 0.0) || !x.is_finite()) {
            return Err(HmmError::ObservationOutOfDomain(format!(
                "log-normal fit needs positive values, got {}",
                x
            )));
        }
        if total == 0.0 {
            return Ok(());
        }
        let (mean, variance) =
            weighted_mean_variance(observations.iter().map(|x| x.ln()), weights, total);
        self.mean = mean;
        self.variance = variance;
        Ok(())
    }
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        (self.mean + self.variance.sqrt() * z).exp()
    }
}

impl std::fmt::Display for OpdfLogNormal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Log-normal distribution --- Mean: {:.4} Variance {:.4}",
            self.mean, self.variance
        )
    }
}
