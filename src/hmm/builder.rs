//!
//! Step by step construction of `Hmm`
//!
//! ```text
//! HmmBuilder::new(2)?
//!     .uniform_pi()
//!     .random_a(&mut rng)
//!     .opdf_factory(OpdfGaussian::default)
//!     .build()?
//! ```
//!
use super::Hmm;
use crate::cluster::{Centroid, KMeansCalculator};
use crate::common::flatten;
use crate::error::{HmmError, Result};
use crate::opdf::Opdf;
use log::debug;
use rand::Rng;

///
/// Builder of `Hmm` from linear-space parameters.
///
/// `pi` and `A` default to uniform when not given. Opdfs must be given by
/// `opdfs`, `opdf_factory` or `opdf_clustering`. All validation happens in
/// `build`.
///
#[derive(Debug, Clone)]
pub struct HmmBuilder<D: Opdf> {
    n_states: usize,
    pi: Option<Vec<f64>>,
    a: Option<Vec<Vec<f64>>>,
    opdfs: Option<Vec<D>>,
}

///
/// Random probability vector of length `n`
///
fn random_distribution<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let xs: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() + f64::EPSILON).collect();
    let total: f64 = xs.iter().sum();
    xs.into_iter().map(|x| x / total).collect()
}

impl<D: Opdf> HmmBuilder<D> {
    pub fn new(n_states: usize) -> Result<Self> {
        if n_states == 0 {
            return Err(HmmError::NoStates);
        }
        Ok(HmmBuilder {
            n_states,
            pi: None,
            a: None,
            opdfs: None,
        })
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn pi(mut self, pi: Vec<f64>) -> Self {
        self.pi = Some(pi);
        self
    }
    pub fn uniform_pi(self) -> Self {
        let n = self.n_states;
        self.pi(vec![1.0 / n as f64; n])
    }
    pub fn random_pi<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let pi = random_distribution(self.n_states, rng);
        self.pi(pi)
    }
    pub fn a(mut self, a: Vec<Vec<f64>>) -> Self {
        self.a = Some(a);
        self
    }
    pub fn uniform_a(self) -> Self {
        let n = self.n_states;
        self.a(vec![vec![1.0 / n as f64; n]; n])
    }
    pub fn random_a<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let n = self.n_states;
        let a = (0..n).map(|_| random_distribution(n, rng)).collect();
        self.a(a)
    }
    pub fn opdfs(mut self, opdfs: Vec<D>) -> Self {
        self.opdfs = Some(opdfs);
        self
    }
    ///
    /// Every state gets a fresh distribution from `factory`
    ///
    pub fn opdf_factory<F: Fn() -> D>(self, factory: F) -> Self {
        let opdfs = (0..self.n_states).map(|_| factory()).collect();
        self.opdfs(opdfs)
    }
    ///
    /// Cluster all observations of `seqs` into `n_states` groups by k-means,
    /// and fit the distribution of state `i` to the cluster `i`.
    /// A state with an empty cluster keeps the distribution of `factory`.
    ///
    pub fn opdf_clustering<S, F, R>(self, factory: F, seqs: &[S], rng: &mut R) -> Result<Self>
    where
        S: AsRef<[D::Observation]>,
        D::Observation: Centroid,
        F: Fn() -> D,
        R: Rng + ?Sized,
    {
        let observations = flatten(seqs);
        let clusters = KMeansCalculator::new(self.n_states, &observations, rng)?;
        let mut opdfs = Vec::with_capacity(self.n_states);
        for i in 0..self.n_states {
            let mut opdf = factory();
            let members: Vec<D::Observation> = clusters
                .cluster(i, &observations)
                .into_iter()
                .cloned()
                .collect();
            debug!("cluster {} has {} observations", i, members.len());
            if !members.is_empty() {
                opdf.fit(&members)?;
            }
            opdfs.push(opdf);
        }
        Ok(self.opdfs(opdfs))
    }
    pub fn build(self) -> Result<Hmm<D>> {
        let n = self.n_states;
        let opdfs = self.opdfs.ok_or(HmmError::DimensionMismatch {
            what: "opdfs",
            expected: n,
            actual: 0,
        })?;
        if opdfs.len() != n {
            return Err(HmmError::DimensionMismatch {
                what: "opdfs",
                expected: n,
                actual: opdfs.len(),
            });
        }
        let pi = self.pi.unwrap_or_else(|| vec![1.0 / n as f64; n]);
        let a = self.a.unwrap_or_else(|| vec![vec![1.0 / n as f64; n]; n]);
        Hmm::new(pi, a, opdfs)
    }
}
