//!
//! globally-available parts
//!
pub use crate::cluster::Centroid;
pub use crate::common::{State, StateSequence};
pub use crate::error::{HmmError, Result};
pub use crate::hmm::{Computation, Hmm, HmmBuilder, ViterbiPath};
pub use crate::learn::{BaumWelch, KMeansLearner};
pub use crate::opdf::{Opdf, OpdfDiscrete, OpdfGaussian, OpdfLogNormal, OpdfReal};
pub use crate::prob::{lp, p, Prob};
