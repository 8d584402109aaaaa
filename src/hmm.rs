//!
//! Hidden Markov model in log space
//!
//! # Overview of calculation
//!
//! o = o[0],...,o[T-1] : Observations of length T
//!
//! Forward
//! alpha[t][i]
//!  = log P(emits o[0..=t] and is in state i at t)
//!
//! Backward
//! beta[t][i]
//!  = log P(emits o[t+1..T] | is in state i at t)
//!  (beta[T-1][i] = log 1)
//!
//! Viterbi
//! delta[t][i]
//!  = min cost (-log P) of a path emitting o[0..=t] and ending in state i
//! psy[t][i]
//!  = the predecessor state of i achieving delta[t][i]
//!
//! Every parameter is held as `Prob` (log probability), and linear values
//! are produced only when converting at the boundary (`pi_value`,
//! `a_value`, `ForwardBackward::probability`).
//!
pub mod builder;
pub mod draw;
pub mod forward_backward;
pub mod mocks;
pub mod sample;
pub mod viterbi;

pub use builder::HmmBuilder;
pub use forward_backward::{Computation, ForwardBackward, Trellis};
pub use viterbi::ViterbiPath;

use crate::common::{State, StateSequence};
use crate::error::{HmmError, Result};
use crate::opdf::Opdf;
use crate::prob::Prob;
use ndarray::{Array1, Array2};

/// Tolerance of `|sum - 1|` of a probability vector
pub const PROB_SUM_TOLERANCE: f64 = 1e-6;

///
/// HMM with `N` states
///
/// * `pi[i]`: log P(state i at t=0)
/// * `a[(i, j)]`: log P(state j at t+1 | state i at t)
/// * `opdfs[i]`: emission distribution of state i
///
#[derive(Debug, Clone)]
pub struct Hmm<D: Opdf> {
    pi: Array1<Prob>,
    a: Array2<Prob>,
    opdfs: Vec<D>,
}

///
/// Check that `values` is a probability vector: every element is finite,
/// non-negative, and they sum to 1.
///
pub fn check_distribution(what: &str, values: &[f64]) -> Result<()> {
    if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(HmmError::InvalidProbability {
            what: what.to_string(),
            reason: format!("element {} is not a probability", v),
        });
    }
    let sum: f64 = values.iter().sum();
    if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
        return Err(HmmError::InvalidProbability {
            what: what.to_string(),
            reason: format!("sums to {}", sum),
        });
    }
    Ok(())
}

impl<D: Opdf> Hmm<D> {
    ///
    /// Create HMM from linear-space parameters.
    ///
    /// `pi` and every row of `a` must be probability vectors of length
    /// `n_states = opdfs.len()`.
    ///
    pub fn new(pi: Vec<f64>, a: Vec<Vec<f64>>, opdfs: Vec<D>) -> Result<Self> {
        let n = opdfs.len();
        if n == 0 {
            return Err(HmmError::NoStates);
        }
        check_len("pi", n, pi.len())?;
        check_distribution("pi", &pi)?;
        check_len("A", n, a.len())?;
        for (i, row) in a.iter().enumerate() {
            check_len("A row", n, row.len())?;
            check_distribution(&format!("A row {}", i), row)?;
        }
        let pi = pi.into_iter().map(Prob::from_prob).collect();
        let a = Array2::from_shape_fn((n, n), |(i, j)| Prob::from_prob(a[i][j]));
        Ok(Hmm { pi, a, opdfs })
    }
    ///
    /// Create HMM from log-space parameters. Only the dimensions are
    /// checked.
    ///
    pub fn from_log(pi: Array1<Prob>, a: Array2<Prob>, opdfs: Vec<D>) -> Result<Self> {
        let n = opdfs.len();
        if n == 0 {
            return Err(HmmError::NoStates);
        }
        check_len("pi", n, pi.len())?;
        check_len("A rows", n, a.nrows())?;
        check_len("A columns", n, a.ncols())?;
        Ok(Hmm { pi, a, opdfs })
    }
    pub fn n_states(&self) -> usize {
        self.opdfs.len()
    }
    ///
    /// log P(state i at t=0)
    ///
    pub fn pi(&self, i: State) -> Prob {
        self.pi[i]
    }
    ///
    /// P(state i at t=0) in linear space
    ///
    pub fn pi_value(&self, i: State) -> f64 {
        self.pi[i].to_value()
    }
    ///
    /// log P(i -> j)
    ///
    pub fn a(&self, i: State, j: State) -> Prob {
        self.a[[i, j]]
    }
    ///
    /// P(i -> j) in linear space
    ///
    pub fn a_value(&self, i: State, j: State) -> f64 {
        self.a[[i, j]].to_value()
    }
    pub fn opdf(&self, i: State) -> &D {
        &self.opdfs[i]
    }
    pub fn opdfs(&self) -> &[D] {
        &self.opdfs
    }
    pub fn pis(&self) -> &Array1<Prob> {
        &self.pi
    }
    pub fn trans(&self) -> &Array2<Prob> {
        &self.a
    }
    pub fn set_pi(&mut self, i: State, value: Prob) {
        self.pi[i] = value;
    }
    pub fn set_a(&mut self, i: State, j: State, value: Prob) {
        self.a[[i, j]] = value;
    }
    pub fn set_opdf(&mut self, i: State, opdf: D) {
        self.opdfs[i] = opdf;
    }
    ///
    /// pi as linear probabilities
    ///
    pub fn pi_values(&self) -> Vec<f64> {
        self.pi.iter().map(|p| p.to_value()).collect()
    }
    ///
    /// A as a linear probability matrix
    ///
    pub fn a_values(&self) -> Vec<Vec<f64>> {
        self.a
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|p| p.to_value()).collect())
            .collect()
    }
    ///
    /// Reject an empty sequence or an observation outside the domain of
    /// some state's distribution.
    ///
    pub fn check_sequence(&self, oseq: &[D::Observation]) -> Result<()> {
        if oseq.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        for o in oseq {
            for opdf in self.opdfs.iter() {
                opdf.check(o)?;
            }
        }
        Ok(())
    }
    ///
    /// `T x N` table of `log P(o[t] | state i)`
    ///
    pub(crate) fn emission_table(&self, oseq: &[D::Observation]) -> Array2<Prob> {
        Array2::from_shape_fn((oseq.len(), self.n_states()), |(t, i)| {
            self.opdfs[i].log_probability(&oseq[t])
        })
    }
    ///
    /// log P(O, Q) of the observations `oseq` emitted along the states `sseq`
    ///
    pub fn ln_probability_of_path(
        &self,
        oseq: &[D::Observation],
        sseq: &[State],
    ) -> Result<Prob> {
        if oseq.len() != sseq.len() {
            return Err(HmmError::LengthMismatch {
                observations: oseq.len(),
                states: sseq.len(),
            });
        }
        self.check_sequence(oseq)?;
        if let Some(&s) = sseq.iter().find(|&&s| s >= self.n_states()) {
            return Err(HmmError::InvalidParameter(format!(
                "state {} is not in 0..{}",
                s,
                self.n_states()
            )));
        }
        let mut lp = self.pi(sseq[0]) * self.opdf(sseq[0]).log_probability(&oseq[0]);
        for t in 1..oseq.len() {
            lp *= self.a(sseq[t - 1], sseq[t]) * self.opdf(sseq[t]).log_probability(&oseq[t]);
        }
        Ok(lp)
    }
    ///
    /// log P(O) by the forward algorithm
    ///
    pub fn ln_probability(&self, oseq: &[D::Observation]) -> Result<Prob> {
        let fb = self.forward_backward(oseq, Computation::ALPHA)?;
        Ok(fb.ln_probability())
    }
    ///
    /// P(O) in linear space. Underflows to 0 for long sequences.
    ///
    pub fn probability(&self, oseq: &[D::Observation]) -> Result<f64> {
        Ok(self.ln_probability(oseq)?.to_value())
    }
    ///
    /// Viterbi state sequence of `oseq`
    ///
    pub fn most_likely_state_sequence(&self, oseq: &[D::Observation]) -> Result<StateSequence> {
        Ok(self.viterbi(oseq)?.states)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(HmmError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}

impl<D: Opdf> std::fmt::Display for Hmm<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "HMM with {} state(s)", self.n_states())?;
        for i in 0..self.n_states() {
            writeln!(f)?;
            writeln!(f, "State {}", i)?;
            writeln!(f, "  Pi: {:.4}", self.pi_value(i))?;
            write!(f, "  Aij:")?;
            for j in 0..self.n_states() {
                write!(f, " {:.4}", self.a_value(i, j))?;
            }
            writeln!(f)?;
            writeln!(f, "  Opdf: {}", self.opdf(i))?;
        }
        Ok(())
    }
}
