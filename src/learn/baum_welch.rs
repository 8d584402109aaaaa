//!
//! Baum-Welch (EM) re-estimation
//!
//! For each sequence `O_k` of length `T_k`,
//!
//! ```text
//! xi_k[t][i][j] = P(state i at t, state j at t+1 | O_k)
//!              ∝ alpha[t][i] a[i][j] b_j(o[t+1]) beta[t+1][j]
//! gamma_k[t][i] = P(state i at t | O_k)
//!              ∝ alpha[t][i] beta[t][i]
//! ```
//!
//! both normalized per `t`. The new parameters are
//!
//! ```text
//! a'[i][j] = sum_{k,t} xi_k[t][i][j] / sum_{k,t<T_k-1} gamma_k[t][i]
//! pi'[i]   = sum_k gamma_k[0][i] / K
//! ```
//!
//! and the opdf of state `i` is fitted to every observation weighted by
//! `gamma_k[t][i]` (normalized over the corpus).
//!
//! A sequence with `P(O_k) = 0` under the current model has no occupancy.
//! It is left out of the sums and of `K`.
//!
use super::{check_corpus, corpus_ln_probability};
use crate::error::{HmmError, Result};
use crate::hmm::Hmm;
use crate::opdf::Opdf;
use crate::prob::Prob;
use log::{debug, info, warn};
use ndarray::{s, Array1, Array2, Array3};
use rayon::prelude::*;

/// Number of iterations of `BaumWelch::default()`
pub const DEFAULT_N_ITERATIONS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaumWelch {
    /// Number of iterations run by `learn`
    pub n_iterations: usize,
    /// Run the per-sequence E-step with rayon
    pub parallel: bool,
}

impl Default for BaumWelch {
    fn default() -> Self {
        BaumWelch {
            n_iterations: DEFAULT_N_ITERATIONS,
            parallel: true,
        }
    }
}

///
/// E-step statistics of a sequence
///
#[derive(Debug, Clone)]
struct Occupancy {
    /// `(T-1) x N x N`
    xi: Array3<Prob>,
    /// `T x N`
    gamma: Array2<Prob>,
    /// `log P(O)`
    ln_probability: Prob,
}

impl<D: Opdf> Hmm<D> {
    ///
    /// Run forward and backward on a checked sequence and compute xi and gamma.
    ///
    fn occupancy(&self, oseq: &[D::Observation]) -> Occupancy {
        let n = self.n_states();
        let t_max = oseq.len();
        let emissions = self.emission_table(oseq);
        let alpha = self.forward(&emissions);
        let beta = self.backward(&emissions);
        let ln_probability = self.ln_probability_from_alpha(&alpha);

        let mut xi = Array3::from_elem((t_max - 1, n, n), Prob::zero());
        for t in 0..t_max - 1 {
            let mut slice = xi.slice_mut(s![t, .., ..]);
            for i in 0..n {
                for j in 0..n {
                    slice[[i, j]] =
                        alpha[[t, i]] * self.a(i, j) * emissions[[t + 1, j]] * beta[[t + 1, j]];
                }
            }
            let total: Prob = slice.iter().sum();
            slice.mapv_inplace(|x| x / total);
        }

        let mut gamma = &alpha * &beta;
        for mut row in gamma.rows_mut() {
            let total: Prob = row.iter().sum();
            row.mapv_inplace(|x| x / total);
        }

        Occupancy {
            xi,
            gamma,
            ln_probability,
        }
    }
}

impl BaumWelch {
    pub fn new(n_iterations: usize) -> Self {
        BaumWelch {
            n_iterations,
            ..Default::default()
        }
    }
    ///
    /// One EM iteration. Returns the new HMM and the log-likelihood of the
    /// corpus under the old one.
    ///
    fn iterate_with_ln_probability<D, S>(&self, hmm: &Hmm<D>, seqs: &[S]) -> Result<(Hmm<D>, Prob)>
    where
        D: Opdf + Sync,
        D::Observation: Sync,
        S: AsRef<[D::Observation]> + Sync,
    {
        check_corpus(hmm, seqs, 2)?;
        let n = hmm.n_states();

        // E-step, collected in the corpus order
        let all: Vec<Occupancy> = if self.parallel {
            seqs.par_iter().map(|seq| hmm.occupancy(seq.as_ref())).collect()
        } else {
            seqs.iter().map(|seq| hmm.occupancy(seq.as_ref())).collect()
        };
        let ln_probability: Prob = all.iter().map(|o| o.ln_probability).product();

        let mut stats = Vec::with_capacity(all.len());
        let mut observations = Vec::new();
        for (index, (seq, o)) in seqs.iter().zip(all).enumerate() {
            if o.ln_probability.is_zero() {
                warn!("sequence #{} has zero probability and is skipped", index);
                continue;
            }
            observations.extend_from_slice(seq.as_ref());
            stats.push(o);
        }
        if stats.is_empty() {
            return Err(HmmError::ZeroLikelihood);
        }
        let k = stats.len();

        // M-step: transitions
        let mut a = Array2::from_elem((n, n), Prob::zero());
        for i in 0..n {
            let den: Prob = stats
                .iter()
                .flat_map(|o| o.gamma.slice(s![..-1, i]).to_vec())
                .sum();
            if den.is_zero() {
                warn!("state {} is never left, transitions are set to uniform", i);
                a.row_mut(i).fill(Prob::from_prob(1.0 / n as f64));
                continue;
            }
            for j in 0..n {
                let num: Prob = stats
                    .iter()
                    .flat_map(|o| o.xi.slice(s![.., i, j]).to_vec())
                    .sum();
                a[[i, j]] = num / den;
            }
        }

        // M-step: initial distribution
        let pi = Array1::from_shape_fn(n, |i| {
            let s: Prob = stats.iter().map(|o| o.gamma[[0, i]]).sum();
            s / k
        });

        // M-step: emissions
        let mut opdfs = hmm.opdfs().to_vec();
        for (i, opdf) in opdfs.iter_mut().enumerate() {
            let gammas: Vec<Prob> = stats
                .iter()
                .flat_map(|o| o.gamma.column(i).to_vec())
                .collect();
            let total: Prob = gammas.iter().sum();
            let weights: Vec<f64> = gammas.iter().map(|&g| (g / total).to_value()).collect();
            opdf.fit_weighted(&observations, &weights)?;
        }

        debug!("baum-welch ln_p={}", ln_probability);
        Ok((Hmm::from_log(pi, a, opdfs)?, ln_probability))
    }
    ///
    /// One EM iteration. `hmm` is not modified.
    ///
    /// Every sequence must have at least 2 observations.
    ///
    pub fn iterate<D, S>(&self, hmm: &Hmm<D>, seqs: &[S]) -> Result<Hmm<D>>
    where
        D: Opdf + Sync,
        D::Observation: Sync,
        S: AsRef<[D::Observation]> + Sync,
    {
        Ok(self.iterate_with_ln_probability(hmm, seqs)?.0)
    }
    ///
    /// Run `n_iterations` EM iterations starting from `hmm`.
    ///
    pub fn learn<D, S>(&self, hmm: &Hmm<D>, seqs: &[S]) -> Result<Hmm<D>>
    where
        D: Opdf + Sync,
        D::Observation: Sync,
        S: AsRef<[D::Observation]> + Sync,
    {
        Ok(self.learn_with_history(hmm, seqs)?.0)
    }
    ///
    /// `learn` that also returns the corpus log-likelihood of each model,
    /// `history[m]` for the model after `m` iterations (`m = 0..=n_iterations`).
    ///
    pub fn learn_with_history<D, S>(&self, hmm: &Hmm<D>, seqs: &[S]) -> Result<(Hmm<D>, Vec<Prob>)>
    where
        D: Opdf + Sync,
        D::Observation: Sync,
        S: AsRef<[D::Observation]> + Sync,
    {
        check_corpus(hmm, seqs, 2)?;
        let mut history = Vec::with_capacity(self.n_iterations + 1);
        let mut current = hmm.clone();
        for _ in 0..self.n_iterations {
            let (next, ln_probability) = self.iterate_with_ln_probability(&current, seqs)?;
            history.push(ln_probability);
            current = next;
        }
        let last = corpus_ln_probability(&current, seqs)?;
        history.push(last);
        info!(
            "baum-welch finished n_iterations={} ln_p={}",
            self.n_iterations, last
        );
        Ok((current, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::{mock_discrete, mock_gaussian};
    use crate::opdf::{OpdfDiscrete, OpdfGaussian};
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn occupancy_is_normalized() {
        let hmm = mock_discrete();
        let o = hmm.occupancy(&[0, 1, 1, 0]);
        assert_eq!(o.xi.dim(), (3, 2, 2));
        for t in 0..3 {
            let s: Prob = o.xi.slice(s![t, .., ..]).iter().sum();
            assert_abs_diff_eq!(s, Prob::one(), epsilon = 1e-12);
            // sum_j xi[t][i][j] = gamma[t][i]
            for i in 0..2 {
                let s: Prob = o.xi.slice(s![t, i, ..]).iter().sum();
                assert_abs_diff_eq!(s, o.gamma[[t, i]], epsilon = 1e-12);
            }
        }
        for row in o.gamma.rows() {
            let s: Prob = row.iter().sum();
            assert_abs_diff_eq!(s, Prob::one(), epsilon = 1e-12);
        }
    }
    #[test]
    fn iterate_keeps_stochastic_parameters() {
        let hmm = mock_discrete();
        let seqs = vec![vec![0usize, 0, 1, 1, 0], vec![1, 1, 1], vec![0, 1]];
        let bw = BaumWelch::default();
        let next = bw.iterate(&hmm, &seqs).unwrap();
        assert_abs_diff_eq!(next.pi_values().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        for row in next.a_values() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
        for opdf in next.opdfs() {
            assert_abs_diff_eq!(opdf.probs().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
        // the input model is untouched
        assert_abs_diff_eq!(hmm.a_value(0, 0), 0.9, epsilon = 1e-12);
    }
    #[test]
    fn iterate_rejects_short_sequences() {
        let hmm = mock_discrete();
        let bw = BaumWelch::default();
        assert!(matches!(
            bw.iterate(&hmm, &[vec![0usize, 1], vec![1]]),
            Err(HmmError::SequenceTooShort {
                index: 1,
                length: 1,
                minimum: 2
            })
        ));
        let empty: Vec<Vec<usize>> = vec![];
        assert!(matches!(bw.iterate(&hmm, &empty), Err(HmmError::EmptyCorpus)));
        assert!(bw.iterate(&hmm, &[vec![0usize, 2]]).is_err());
    }
    #[test]
    fn parallel_and_serial_agree() {
        let hmm = mock_gaussian();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let seqs = hmm.sample_corpus(8, 50, &mut rng);
        let serial = BaumWelch {
            n_iterations: 3,
            parallel: false,
        }
        .learn(&hmm, &seqs)
        .unwrap();
        let parallel = BaumWelch {
            n_iterations: 3,
            parallel: true,
        }
        .learn(&hmm, &seqs)
        .unwrap();
        assert_eq!(serial.trans(), parallel.trans());
        assert_eq!(serial.pis(), parallel.pis());
        assert_eq!(serial.opdfs(), parallel.opdfs());
    }
    #[test]
    fn unreachable_state_gets_uniform_row() {
        // state 1 is never visited
        let hmm = Hmm::new(
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![0.5, 0.5]],
            vec![
                OpdfDiscrete::new(vec![0.5, 0.5]).unwrap(),
                OpdfDiscrete::new(vec![0.5, 0.5]).unwrap(),
            ],
        )
        .unwrap();
        let next = BaumWelch::default().iterate(&hmm, &[vec![0usize, 1, 1]]).unwrap();
        assert_abs_diff_eq!(next.a_value(1, 0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(next.a_value(1, 1), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(next.a_value(0, 0), 1.0, epsilon = 1e-12);
        // zero occupancy keeps the emission parameters
        assert_eq!(next.opdf(1), hmm.opdf(1));
        assert!(next.pi(1).is_zero());
    }
    /// state 0 emits only 0, state 1 emits only 1, and 1 -> 0 is forbidden
    fn left_to_right() -> Hmm<OpdfDiscrete> {
        Hmm::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.0, 1.0]],
            vec![
                OpdfDiscrete::new(vec![1.0, 0.0]).unwrap(),
                OpdfDiscrete::new(vec![0.0, 1.0]).unwrap(),
            ],
        )
        .unwrap()
    }
    #[test]
    fn impossible_sequence_is_skipped() {
        let hmm = left_to_right();
        let seqs = vec![vec![0usize, 1, 1], vec![0, 1, 0]];
        assert!(hmm.probability(&seqs[1]).unwrap() == 0.0);
        for parallel in [false, true] {
            let bw = BaumWelch {
                n_iterations: 1,
                parallel,
            };
            let next = bw.iterate(&hmm, &seqs).unwrap();
            assert_abs_diff_eq!(next.pi_values().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            for row in next.a_values() {
                assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            }
            // same as training on the possible sequence alone
            let alone = bw.iterate(&hmm, &[vec![0usize, 1, 1]]).unwrap();
            assert_eq!(next.pis(), alone.pis());
            assert_eq!(next.trans(), alone.trans());
            assert_eq!(next.opdfs(), alone.opdfs());
        }
        // the input model is untouched
        assert_abs_diff_eq!(hmm.pi_value(0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hmm.a_value(1, 0), 0.0, epsilon = 1e-12);
    }
    #[test]
    fn all_impossible_sequences_are_rejected() {
        let hmm = left_to_right();
        let seqs = vec![vec![0usize, 1, 0], vec![1, 0]];
        assert!(matches!(
            BaumWelch::default().iterate(&hmm, &seqs),
            Err(HmmError::ZeroLikelihood)
        ));
        assert!(matches!(
            BaumWelch::default().learn(&hmm, &seqs),
            Err(HmmError::ZeroLikelihood)
        ));
    }
    #[test]
    fn underflowing_likelihood_is_learned_in_log_space() {
        // P(O) <= (0.9 * 0.7)^5000, far below f64::MIN_POSITIVE
        let hmm = mock_discrete();
        let seqs = vec![vec![1usize, 0].repeat(5000); 2];
        assert_eq!(hmm.probability(&seqs[0]).unwrap(), 0.0);
        assert!(!hmm.ln_probability(&seqs[0]).unwrap().is_zero());
        let (next, history) = BaumWelch::new(2).learn_with_history(&hmm, &seqs).unwrap();
        assert!(history.iter().all(|p| p.to_log_value().is_finite()));
        assert_abs_diff_eq!(next.pi_values().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        for row in next.a_values() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
        for opdf in next.opdfs() {
            assert_abs_diff_eq!(opdf.probs().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(hmm.a_value(0, 0), 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(hmm.pi_value(1), 0.5, epsilon = 1e-12);
    }
    #[test]
    fn learn_history_is_non_decreasing() {
        let truth = mock_gaussian();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let seqs = truth.sample_corpus(5, 100, &mut rng);
        let init = Hmm::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![
                OpdfGaussian::new(1.0, 3.0).unwrap(),
                OpdfGaussian::new(3.0, 3.0).unwrap(),
            ],
        )
        .unwrap();
        let bw = BaumWelch::default();
        let (learned, history) = bw.learn_with_history(&init, &seqs).unwrap();
        assert_eq!(history.len(), DEFAULT_N_ITERATIONS + 1);
        for w in history.windows(2) {
            assert!(w[1].to_log_value() >= w[0].to_log_value() - 1e-8);
        }
        let mut means: Vec<f64> = learned.opdfs().iter().map(|o| o.mean()).collect();
        means.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(means[0], 0.0, epsilon = 0.5);
        assert_abs_diff_eq!(means[1], 5.0, epsilon = 0.5);
    }
}
