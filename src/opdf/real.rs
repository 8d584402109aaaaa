//!
//! Real-valued opdf whose family is chosen at runtime
//!
use super::{OpdfGaussian, OpdfLogNormal, Opdf};
use crate::common::Weight;
use crate::error::Result;
use crate::prob::Prob;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpdfReal {
    Gaussian(OpdfGaussian),
    LogNormal(OpdfLogNormal),
}

impl From<OpdfGaussian> for OpdfReal {
    fn from(d: OpdfGaussian) -> Self {
        OpdfReal::Gaussian(d)
    }
}

impl From<OpdfLogNormal> for OpdfReal {
    fn from(d: OpdfLogNormal) -> Self {
        OpdfReal::LogNormal(d)
    }
}

impl Opdf for OpdfReal {
    type Observation = f64;

    fn log_probability(&self, x: &f64) -> Prob {
        match self {
            OpdfReal::Gaussian(d) => d.log_probability(x),
            OpdfReal::LogNormal(d) => d.log_probability(x),
        }
    }
    fn probability(&self, x: &f64) -> f64 {
        match self {
            OpdfReal::Gaussian(d) => d.probability(x),
            OpdfReal::LogNormal(d) => d.probability(x),
        }
    }
    fn check(&self, x: &f64) -> Result<()> {
        match self {
            OpdfReal::Gaussian(d) => d.check(x),
            OpdfReal::LogNormal(d) => d.check(x),
        }
    }
    fn fit_weighted(&mut self, observations: &[f64], weights: &[Weight]) -> Result<()> {
        match self {
            OpdfReal::Gaussian(d) => d.fit_weighted(observations, weights),
            OpdfReal::LogNormal(d) => d.fit_weighted(observations, weights),
        }
    }
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            OpdfReal::Gaussian(d) => d.sample(rng),
            OpdfReal::LogNormal(d) => d.sample(rng),
        }
    }
}

impl std::fmt::Display for OpdfReal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OpdfReal::Gaussian(d) => write!(f, "{}", d),
            OpdfReal::LogNormal(d) => write!(f, "{}", d),
        }
    }
}
