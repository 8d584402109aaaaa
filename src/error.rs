//!
//! Error types of hmm construction, inference and learning
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    /// HMM with no states
    #[error("number of states must be positive")]
    NoStates,

    /// pi/A/opdfs dimension does not match the number of states
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Probability vector with negative entries or not summing to one
    #[error("invalid probability vector ({what}): {reason}")]
    InvalidProbability { what: String, reason: String },

    /// Distribution parameter out of range (e.g. non-positive variance)
    #[error("invalid distribution parameter: {0}")]
    InvalidParameter(String),

    /// Observation sequence with no observations
    #[error("observation sequence is empty")]
    EmptySequence,

    /// Sequence too short for the requested computation
    #[error("observation sequence #{index} has length {length}, at least {minimum} is required")]
    SequenceTooShort {
        index: usize,
        length: usize,
        minimum: usize,
    },

    /// Training set with no sequences
    #[error("no observation sequence is given")]
    EmptyCorpus,

    /// Every training sequence is impossible under the current model
    #[error("every observation sequence has zero probability under the model")]
    ZeroLikelihood,

    /// Observation and state sequence of different lengths
    #[error("observation sequence has length {observations} but state sequence has length {states}")]
    LengthMismatch { observations: usize, states: usize },

    /// Observation that the emission distribution cannot handle
    #[error("observation out of domain: {0}")]
    ObservationOutOfDomain(String),

    /// Neither alpha nor beta was requested from forward-backward
    #[error("forward-backward needs at least one of alpha and beta")]
    NothingToCompute,

    /// Malformed model/sequence text
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Malformed learning configuration
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;
