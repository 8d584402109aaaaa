//!
//! Distribution over a finite set of symbols `0..n_symbols`
//!
use super::{check_weights, Opdf};
use crate::common::Weight;
use crate::error::{HmmError, Result};
use crate::hmm::check_distribution;
use crate::prob::Prob;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct OpdfDiscrete {
    /// `probs[k]` = P(symbol k)
    probs: Vec<f64>,
}

impl OpdfDiscrete {
    ///
    /// Distribution with the given symbol probabilities.
    /// `probs` must be non-empty, non-negative and sum to 1.
    ///
    pub fn new(probs: Vec<f64>) -> Result<Self> {
        if probs.is_empty() {
            return Err(HmmError::InvalidParameter(
                "discrete distribution needs at least one symbol".to_string(),
            ));
        }
        check_distribution("discrete opdf", &probs)?;
        Ok(OpdfDiscrete { probs })
    }
    ///
    /// Uniform distribution over `n_symbols` symbols
    ///
    pub fn uniform(n_symbols: usize) -> Result<Self> {
        if n_symbols == 0 {
            return Err(HmmError::InvalidParameter(
                "discrete distribution needs at least one symbol".to_string(),
            ));
        }
        Ok(OpdfDiscrete {
            probs: vec![1.0 / n_symbols as f64; n_symbols],
        })
    }
    pub fn n_symbols(&self) -> usize {
        self.probs.len()
    }
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }
}

impl Opdf for OpdfDiscrete {
    type Observation = usize;

    fn log_probability(&self, o: &usize) -> Prob {
        match self.probs.get(*o) {
            Some(&p) => Prob::from_prob(p),
            None => Prob::zero(),
        }
    }
    fn check(&self, o: &usize) -> Result<()> {
        if *o < self.n_symbols() {
            Ok(())
        } else {
            Err(HmmError::ObservationOutOfDomain(format!(
                "symbol {} is not in 0..{}",
                o,
                self.n_symbols()
            )))
        }
    }
    fn fit_weighted(&mut self, observations: &[usize], weights: &[Weight]) -> Result<()> {
        let total = check_weights(observations, weights)?;
        for o in observations {
            self.check(o)?;
        }
        if total == 0.0 {
            return Ok(());
        }
        let mut probs = vec![0.0; self.n_symbols()];
        for (&o, &w) in observations.iter().zip(weights) {
            probs[o] += w;
        }
        for p in probs.iter_mut() {
            *p /= total;
        }
        self.probs = probs;
        Ok(())
    }
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.gen();
        let mut cum = 0.0;
        for (k, &p) in self.probs.iter().enumerate() {
            cum += p;
            if u < cum {
                return k;
            }
        }
        // rounding: fall back to the last symbol that has a probability
        self.probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
    }
}

impl std::fmt::Display for OpdfDiscrete {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Integer distribution ---")?;
        for (k, p) in self.probs.iter().enumerate() {
            write!(f, " {} {:.4}", k, p)?;
        }
        Ok(())
    }
}
