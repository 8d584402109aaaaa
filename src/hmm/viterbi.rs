//!
//! Viterbi algorithm
//!
//! Works on costs `-log p` so that the recursion is a minimization.
//!
use super::Hmm;
use crate::common::{State, StateSequence};
use crate::error::Result;
use crate::opdf::Opdf;
use crate::prob::Prob;
use ndarray::Array2;

///
/// Most likely state sequence and its cost `-log P(O, Q)`
///
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    pub states: StateSequence,
    pub cost: f64,
}

impl ViterbiPath {
    ///
    /// log P(O, Q) of the path
    ///
    pub fn ln_probability(&self) -> Prob {
        Prob::from_log_prob(-self.cost)
    }
}

///
/// (argmin, min) of `f(i)` for `i` in `0..n`. The first minimizer wins and
/// `0` is returned if every value is infinite.
///
fn argmin<F: Fn(usize) -> f64>(n: usize, f: F) -> (State, f64) {
    let mut best = (0, f64::INFINITY);
    for i in 0..n {
        let v = f(i);
        if v < best.1 {
            best = (i, v);
        }
    }
    best
}

impl<D: Opdf> Hmm<D> {
    ///
    /// Run Viterbi and backtrack the most likely state sequence.
    ///
    /// ```text
    /// delta[0][i] = -log(pi[i] b_i(o[0]))
    /// delta[t][j] = min_i (delta[t-1][i] - log a[i][j]) - log b_j(o[t])
    /// psy[t][j]   = argmin_i (delta[t-1][i] - log a[i][j])
    /// ```
    ///
    pub fn viterbi(&self, oseq: &[D::Observation]) -> Result<ViterbiPath> {
        self.check_sequence(oseq)?;
        let n = self.n_states();
        let t_max = oseq.len();
        let emissions = self.emission_table(oseq);
        let mut delta = Array2::from_elem((t_max, n), f64::INFINITY);
        let mut psy: Array2<State> = Array2::zeros((t_max, n));

        for i in 0..n {
            delta[[0, i]] = (self.pi[i] * emissions[[0, i]]).to_cost();
        }
        for t in 1..t_max {
            for j in 0..n {
                let (i_min, d_min) = argmin(n, |i| delta[[t - 1, i]] + self.a[[i, j]].to_cost());
                delta[[t, j]] = d_min + emissions[[t, j]].to_cost();
                psy[[t, j]] = i_min;
            }
        }

        let (last, cost) = argmin(n, |i| delta[[t_max - 1, i]]);
        let mut states = vec![0; t_max];
        states[t_max - 1] = last;
        for t in (0..t_max - 1).rev() {
            states[t] = psy[[t + 1, states[t + 1]]];
        }
        Ok(ViterbiPath { states, cost })
    }
}

#[cfg(test)]
mod tests {
    use super::super::mocks::{mock_discrete, mock_gaussian};
    use super::*;
    use crate::error::HmmError;
    use crate::opdf::OpdfDiscrete;
    use itertools::Itertools;
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn viterbi_golden_path() {
        let hmm = mock_discrete();
        let path = hmm.viterbi(&[0, 0, 1]).unwrap();
        assert_eq!(path.states, vec![0, 0, 0]);
        // 0.5 * 0.7 * 0.9 * 0.7 * 0.9 * 0.3
        assert_abs_diff_eq!(path.ln_probability().to_value(), 0.059535, epsilon = 1e-12);
        assert_abs_diff_eq!(path.cost, -(0.059535f64).ln(), epsilon = 1e-12);
        assert_eq!(hmm.most_likely_state_sequence(&[0, 0, 1]).unwrap(), path.states);
    }
    #[test]
    fn viterbi_beats_every_path() {
        let hmm = mock_gaussian();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        for _ in 0..10 {
            let (_, oseq) = hmm.sample(4, &mut rng);
            let path = hmm.viterbi(&oseq).unwrap();
            let lp = hmm.ln_probability_of_path(&oseq, &path.states).unwrap();
            assert_abs_diff_eq!(lp.to_cost(), path.cost, epsilon = 1e-9);
            for sseq in (0..4).map(|_| 0..2).multi_cartesian_product() {
                let other = hmm.ln_probability_of_path(&oseq, &sseq).unwrap();
                assert!(path.cost <= other.to_cost() + 1e-12);
            }
        }
    }
    #[test]
    fn viterbi_ties_go_to_lowest_state() {
        let d = OpdfDiscrete::uniform(2).unwrap();
        let hmm = Hmm::new(vec![0.5, 0.5], vec![vec![0.5, 0.5]; 2], vec![d.clone(), d]).unwrap();
        let path = hmm.viterbi(&[0, 1, 1, 0]).unwrap();
        assert_eq!(path.states, vec![0, 0, 0, 0]);
    }
    #[test]
    fn viterbi_impossible_sequence() {
        // state 0 emits only 0, state 1 emits only 1, and 1 -> 0 is forbidden
        let hmm = Hmm::new(
            vec![1.0, 0.0],
            vec![vec![0.5, 0.5], vec![0.0, 1.0]],
            vec![
                OpdfDiscrete::new(vec![1.0, 0.0]).unwrap(),
                OpdfDiscrete::new(vec![0.0, 1.0]).unwrap(),
            ],
        )
        .unwrap();
        let path = hmm.viterbi(&[0, 1, 1]).unwrap();
        assert_eq!(path.states, vec![0, 1, 1]);
        let path = hmm.viterbi(&[0, 1, 0]).unwrap();
        assert!(path.cost.is_infinite());
        assert!(path.ln_probability().is_zero());
        assert!(!path.cost.is_nan());
    }
    #[test]
    fn viterbi_rejects_invalid_sequence() {
        let hmm = mock_discrete();
        assert!(matches!(hmm.viterbi(&[]), Err(HmmError::EmptySequence)));
        assert!(hmm.viterbi(&[0, 7]).is_err());
    }
}
