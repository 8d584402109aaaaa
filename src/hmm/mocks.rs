//!
//! Mock HMMs for testing
//!
use super::Hmm;
use crate::opdf::{OpdfDiscrete, OpdfGaussian};

///
/// Two states emitting two symbols
///
/// ```text
/// pi = (0.5, 0.5)
/// A  = ((0.9, 0.1), (0.2, 0.8))
/// B  = ((0.7, 0.3), (0.1, 0.9))
/// ```
///
pub fn mock_discrete() -> Hmm<OpdfDiscrete> {
    Hmm::new(
        vec![0.5, 0.5],
        vec![vec![0.9, 0.1], vec![0.2, 0.8]],
        vec![
            OpdfDiscrete::new(vec![0.7, 0.3]).unwrap(),
            OpdfDiscrete::new(vec![0.1, 0.9]).unwrap(),
        ],
    )
    .unwrap()
}

///
/// Two states emitting well separated gaussians `N(0, 1)` and `N(5, 2)`
///
pub fn mock_gaussian() -> Hmm<OpdfGaussian> {
    Hmm::new(
        vec![0.6, 0.4],
        vec![vec![0.8, 0.2], vec![0.3, 0.7]],
        vec![
            OpdfGaussian::new(0.0, 1.0).unwrap(),
            OpdfGaussian::new(5.0, 2.0).unwrap(),
        ],
    )
    .unwrap()
}
