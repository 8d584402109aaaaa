//!
//! Forward and backward algorithm
//!
use super::Hmm;
use crate::error::{HmmError, Result};
use crate::opdf::Opdf;
use crate::prob::Prob;
use ndarray::{Array1, Array2, ArrayView1};

///
/// `T x N` table of log probabilities indexed by `[t, state]`
///
pub type Trellis = Array2<Prob>;

///
/// Set of tables that `Hmm::forward_backward` should fill
///
/// ```text
/// Computation::ALPHA | Computation::BETA
/// ```
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Computation {
    alpha: bool,
    beta: bool,
}

impl Computation {
    pub const ALPHA: Computation = Computation {
        alpha: true,
        beta: false,
    };
    pub const BETA: Computation = Computation {
        alpha: false,
        beta: true,
    };
    pub const BOTH: Computation = Computation {
        alpha: true,
        beta: true,
    };
    pub const NONE: Computation = Computation {
        alpha: false,
        beta: false,
    };
    pub fn alpha(&self) -> bool {
        self.alpha
    }
    pub fn beta(&self) -> bool {
        self.beta
    }
}

impl std::ops::BitOr for Computation {
    type Output = Computation;
    fn bitor(self, rhs: Computation) -> Computation {
        Computation {
            alpha: self.alpha || rhs.alpha,
            beta: self.beta || rhs.beta,
        }
    }
}

///
/// Result of forward-backward
///
#[derive(Debug, Clone)]
pub struct ForwardBackward {
    alpha: Option<Trellis>,
    beta: Option<Trellis>,
    ln_probability: Prob,
}

impl ForwardBackward {
    ///
    /// `alpha[t][i] = log P(o[0..=t], state i at t)` if computed
    ///
    pub fn alpha(&self) -> Option<&Trellis> {
        self.alpha.as_ref()
    }
    ///
    /// `beta[t][i] = log P(o[t+1..T] | state i at t)` if computed
    ///
    pub fn beta(&self) -> Option<&Trellis> {
        self.beta.as_ref()
    }
    ///
    /// log P(O)
    ///
    pub fn ln_probability(&self) -> Prob {
        self.ln_probability
    }
    ///
    /// P(O) in linear space. This can underflow to 0.
    ///
    pub fn probability(&self) -> f64 {
        self.ln_probability.to_value()
    }
}

impl<D: Opdf> Hmm<D> {
    ///
    /// Run the forward and/or the backward algorithm on `oseq`.
    ///
    /// The likelihood is taken from alpha when it is computed, and from
    /// beta and the initial step otherwise.
    ///
    pub fn forward_backward(
        &self,
        oseq: &[D::Observation],
        flags: Computation,
    ) -> Result<ForwardBackward> {
        if flags == Computation::NONE {
            return Err(HmmError::NothingToCompute);
        }
        self.check_sequence(oseq)?;
        let emissions = self.emission_table(oseq);
        let alpha = if flags.alpha() {
            Some(self.forward(&emissions))
        } else {
            None
        };
        let beta = if flags.beta() {
            Some(self.backward(&emissions))
        } else {
            None
        };
        let ln_probability = match (&alpha, &beta) {
            (Some(alpha), _) => self.ln_probability_from_alpha(alpha),
            (None, Some(beta)) => self.ln_probability_from_beta(beta, &emissions),
            (None, None) => return Err(HmmError::NothingToCompute),
        };
        Ok(ForwardBackward {
            alpha,
            beta,
            ln_probability,
        })
    }
    ///
    /// Forward trellis from the emission table `emissions[t][i] = log P(o[t] | i)`.
    ///
    pub(crate) fn forward(&self, emissions: &Array2<Prob>) -> Trellis {
        let (t_max, n) = emissions.dim();
        let mut alpha = Array2::from_elem((t_max, n), Prob::zero());
        alpha.row_mut(0).assign(&self.f_init(emissions.row(0)));
        for t in 1..t_max {
            let next = self.f_step(alpha.row(t - 1), emissions.row(t));
            alpha.row_mut(t).assign(&next);
        }
        alpha
    }
    /// `alpha[0][i] = pi[i] b_i(o[0])`
    fn f_init(&self, emission: ArrayView1<Prob>) -> Array1<Prob> {
        Array1::from_shape_fn(self.n_states(), |i| self.pi[i] * emission[i])
    }
    /// `alpha[t][j] = (sum_i alpha[t-1][i] a[i][j]) b_j(o[t])`
    fn f_step(&self, prev: ArrayView1<Prob>, emission: ArrayView1<Prob>) -> Array1<Prob> {
        Array1::from_shape_fn(self.n_states(), |j| {
            let s: Prob = (0..self.n_states()).map(|i| prev[i] * self.a[[i, j]]).sum();
            s * emission[j]
        })
    }
    ///
    /// Backward trellis from the emission table.
    ///
    pub(crate) fn backward(&self, emissions: &Array2<Prob>) -> Trellis {
        let (t_max, n) = emissions.dim();
        let mut beta = Array2::from_elem((t_max, n), Prob::zero());
        beta.row_mut(t_max - 1).fill(Prob::one());
        for t in (0..t_max - 1).rev() {
            let next = self.b_step(beta.row(t + 1), emissions.row(t + 1));
            beta.row_mut(t).assign(&next);
        }
        beta
    }
    /// `beta[t][i] = sum_j a[i][j] b_j(o[t+1]) beta[t+1][j]`
    fn b_step(&self, next: ArrayView1<Prob>, emission: ArrayView1<Prob>) -> Array1<Prob> {
        Array1::from_shape_fn(self.n_states(), |i| {
            (0..self.n_states())
                .map(|j| next[j] * self.a[[i, j]] * emission[j])
                .sum()
        })
    }
    /// `P(O) = sum_i alpha[T-1][i]`
    pub(crate) fn ln_probability_from_alpha(&self, alpha: &Trellis) -> Prob {
        alpha.row(alpha.nrows() - 1).iter().sum()
    }
    /// `P(O) = sum_i pi[i] b_i(o[0]) beta[0][i]`
    pub(crate) fn ln_probability_from_beta(&self, beta: &Trellis, emissions: &Array2<Prob>) -> Prob {
        (0..self.n_states())
            .map(|i| self.pi[i] * emissions[[0, i]] * beta[[0, i]])
            .sum()
    }
}
