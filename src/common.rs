//!
//! Types shared by the inference and learning code
//!

/// Index of a hidden state, in `0..n_states`
pub type State = usize;

/// Sequence of hidden states, one per observation
pub type StateSequence = Vec<State>;

/// Weight of an observation when fitting a distribution (linear space)
pub type Weight = f64;

///
/// Concatenate all observations of a corpus in sequence order.
///
pub fn flatten<O: Clone, S: AsRef<[O]>>(seqs: &[S]) -> Vec<O> {
    seqs.iter()
        .flat_map(|seq| seq.as_ref().iter().cloned())
        .collect()
}

///
/// Position of each sequence in the flattened corpus.
///
/// `offsets[k]` is the flat index of the first observation of `seqs[k]`,
/// so `(k, t)` is at `offsets[k] + t`.
///
pub fn offsets<O, S: AsRef<[O]>>(seqs: &[S]) -> Vec<usize> {
    seqs.iter()
        .scan(0, |head, seq| {
            let offset = *head;
            *head += seq.as_ref().len();
            Some(offset)
        })
        .collect()
}

///
/// Total number of observations in the corpus
///
pub fn n_observations<O, S: AsRef<[O]>>(seqs: &[S]) -> usize {
    seqs.iter().map(|seq| seq.as_ref().len()).sum()
}
