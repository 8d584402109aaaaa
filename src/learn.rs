//!
//! Parameter learning of HMM
//!
//! * `BaumWelch`: EM re-estimation of an existing HMM
//! * `KMeansLearner`: HMM from scratch by clustering and Viterbi
//!   reassignment. Useful as the initial model of Baum-Welch.
//!
pub mod baum_welch;
pub mod kmeans;

pub use baum_welch::BaumWelch;
pub use kmeans::KMeansLearner;

use crate::error::{HmmError, Result};
use crate::hmm::Hmm;
use crate::opdf::Opdf;
use crate::prob::Prob;
use rayon::prelude::*;

///
/// Reject an empty corpus, or a sequence that is shorter than `minimum` or
/// out of the domain of the HMM.
///
pub(crate) fn check_corpus<D, S>(hmm: &Hmm<D>, seqs: &[S], minimum: usize) -> Result<()>
where
    D: Opdf,
    S: AsRef<[D::Observation]>,
{
    if seqs.is_empty() {
        return Err(HmmError::EmptyCorpus);
    }
    for (index, seq) in seqs.iter().enumerate() {
        let seq = seq.as_ref();
        if seq.len() < minimum {
            return Err(HmmError::SequenceTooShort {
                index,
                length: seq.len(),
                minimum,
            });
        }
        hmm.check_sequence(seq)?;
    }
    Ok(())
}

///
/// `log P(O_1, ..., O_K) = sum_k log P(O_k)` of the independent sequences
///
pub fn corpus_ln_probability<D, S>(hmm: &Hmm<D>, seqs: &[S]) -> Result<Prob>
where
    D: Opdf + Sync,
    D::Observation: Sync,
    S: AsRef<[D::Observation]> + Sync,
{
    check_corpus(hmm, seqs, 1)?;
    let lps: Vec<Prob> = seqs
        .par_iter()
        .map(|seq| {
            let emissions = hmm.emission_table(seq.as_ref());
            hmm.ln_probability_from_alpha(&hmm.forward(&emissions))
        })
        .collect();
    Ok(lps.into_iter().product())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::mock_discrete;

    #[test]
    fn corpus_probability_is_product() {
        let hmm = mock_discrete();
        let seqs = vec![vec![0usize, 0, 1], vec![1, 1]];
        let lp = corpus_ln_probability(&hmm, &seqs).unwrap();
        let expected = hmm.probability(&seqs[0]).unwrap() * hmm.probability(&seqs[1]).unwrap();
        assert_abs_diff_eq!(lp.to_value(), expected, epsilon = 1e-12);
        let empty: Vec<Vec<usize>> = vec![];
        assert!(matches!(
            corpus_ln_probability(&hmm, &empty),
            Err(HmmError::EmptyCorpus)
        ));
        assert!(matches!(
            check_corpus(&hmm, &[vec![0usize, 1], vec![0]], 2),
            Err(HmmError::SequenceTooShort { index: 1, .. })
        ));
    }
}
