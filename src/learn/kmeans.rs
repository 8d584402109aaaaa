//!
//! K-means learner of HMM
//!
//! All observations of the corpus are clustered into `n_states` groups and
//! cluster `i` is regarded as the observations emitted by state `i`. An
//! iteration builds HMM from the clusters and moves every observation to
//! the cluster of its Viterbi state, until no observation moves.
//!
use crate::cluster::{Centroid, KMeansCalculator};
use crate::common::{flatten, offsets};
use crate::error::{HmmError, Result};
use crate::hmm::Hmm;
use crate::opdf::Opdf;
use crate::prob::Prob;
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use rand::Rng;

pub struct KMeansLearner<'a, D, S, F>
where
    D: Opdf,
    F: Fn() -> D,
{
    n_states: usize,
    factory: F,
    seqs: &'a [S],
    /// all observations of `seqs`, in sequence order
    observations: Vec<D::Observation>,
    /// flat index of the first observation of each sequence
    offsets: Vec<usize>,
    clusters: KMeansCalculator,
    terminated: bool,
}

impl<'a, D, S, F> KMeansLearner<'a, D, S, F>
where
    D: Opdf,
    D::Observation: Centroid,
    S: AsRef<[D::Observation]>,
    F: Fn() -> D,
{
    ///
    /// Cluster the observations of `seqs` into `n_states` groups.
    ///
    /// `factory` gives the distribution that is fitted to each cluster, and
    /// is used as is for a state with an empty cluster.
    ///
    pub fn new<R: Rng + ?Sized>(
        n_states: usize,
        factory: F,
        seqs: &'a [S],
        rng: &mut R,
    ) -> Result<Self> {
        if n_states == 0 {
            return Err(HmmError::NoStates);
        }
        if seqs.is_empty() {
            return Err(HmmError::EmptyCorpus);
        }
        let template = factory();
        for (index, seq) in seqs.iter().enumerate() {
            let seq = seq.as_ref();
            if seq.is_empty() {
                return Err(HmmError::SequenceTooShort {
                    index,
                    length: 0,
                    minimum: 1,
                });
            }
            for o in seq {
                template.check(o)?;
            }
        }
        let observations = flatten(seqs);
        let offsets = offsets(seqs);
        let clusters = KMeansCalculator::new(n_states, &observations, rng)?;
        Ok(KMeansLearner {
            n_states,
            factory,
            seqs,
            observations,
            offsets,
            clusters,
            terminated: false,
        })
    }
    ///
    /// `true` if the last `iterate` moved no observation
    ///
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
    pub fn clusters(&self) -> &KMeansCalculator {
        &self.clusters
    }
    ///
    /// Cluster of the `t`-th observation of the `k`-th sequence
    ///
    fn label(&self, k: usize, t: usize) -> usize {
        self.clusters.label(self.offsets[k] + t)
    }
    ///
    /// `pi[i]` = fraction of the sequences starting in cluster `i`
    ///
    fn learn_pi(&self) -> Array1<Prob> {
        let mut counts = vec![0usize; self.n_states];
        for k in 0..self.seqs.len() {
            counts[self.label(k, 0)] += 1;
        }
        counts
            .into_iter()
            .map(|c| Prob::from_prob(c as f64 / self.seqs.len() as f64))
            .collect()
    }
    ///
    /// `a[i][j]` = fraction of the transitions from cluster `i` going to `j`.
    /// A cluster that is never left gets the uniform row.
    ///
    fn learn_a(&self) -> Array2<Prob> {
        let n = self.n_states;
        let mut counts = Array2::<usize>::zeros((n, n));
        for (k, seq) in self.seqs.iter().enumerate() {
            for t in 1..seq.as_ref().len() {
                counts[[self.label(k, t - 1), self.label(k, t)]] += 1;
            }
        }
        let mut a = Array2::from_elem((n, n), Prob::zero());
        for i in 0..n {
            let total: usize = counts.row(i).sum();
            for j in 0..n {
                a[[i, j]] = if total == 0 {
                    Prob::from_prob(1.0 / n as f64)
                } else {
                    Prob::from_prob(counts[[i, j]] as f64 / total as f64)
                };
            }
        }
        a
    }
    fn learn_opdfs(&self) -> Result<Vec<D>> {
        let mut opdfs = Vec::with_capacity(self.n_states);
        for i in 0..self.n_states {
            let mut opdf = (self.factory)();
            let members: Vec<D::Observation> = self
                .clusters
                .cluster(i, &self.observations)
                .into_iter()
                .cloned()
                .collect();
            if members.is_empty() {
                warn!("cluster {} is empty, its state keeps the default distribution", i);
            } else {
                opdf.fit(&members)?;
            }
            opdfs.push(opdf);
        }
        Ok(opdfs)
    }
    ///
    /// Move each observation to the cluster of its Viterbi state.
    /// Returns the number of moved observations.
    ///
    fn reassign(&mut self, hmm: &Hmm<D>) -> Result<usize> {
        let mut n_moved = 0;
        for (k, seq) in self.seqs.iter().enumerate() {
            let states = hmm.viterbi(seq.as_ref())?.states;
            for (t, &state) in states.iter().enumerate() {
                let index = self.offsets[k] + t;
                if self.clusters.label(index) != state {
                    self.clusters.assign(index, state);
                    n_moved += 1;
                }
            }
        }
        Ok(n_moved)
    }
    ///
    /// HMM of the current clusters, without reassignment
    ///
    pub fn hmm(&self) -> Result<Hmm<D>> {
        Hmm::from_log(self.learn_pi(), self.learn_a(), self.learn_opdfs()?)
    }
    ///
    /// Build HMM from the current clusters, then reassign the observations
    /// by Viterbi under it. Returns the HMM built before the reassignment.
    ///
    pub fn iterate(&mut self) -> Result<Hmm<D>> {
        let hmm = self.hmm()?;
        let n_moved = self.reassign(&hmm)?;
        debug!("kmeans-learner moved={}", n_moved);
        self.terminated = n_moved == 0;
        Ok(hmm)
    }
    ///
    /// Iterate until no observation moves, and return the HMM of the
    /// final clusters.
    ///
    pub fn learn(&mut self) -> Result<Hmm<D>> {
        let mut n_iterations = 0;
        loop {
            let hmm = self.iterate()?;
            n_iterations += 1;
            if self.terminated {
                info!("kmeans-learner converged n_iterations={}", n_iterations);
                return Ok(hmm);
            }
        }
    }
}
