//!
//! Learning configuration
//!
//! ```json
//! {
//!   "n_states": 2,
//!   "n_iterations": 9,
//!   "seed": 0,
//!   "opdf": {"discrete": {"n_symbols": 4}},
//!   "parallel": true
//! }
//! ```
//!
//! Missing fields take the default values.
//!
use crate::error::{HmmError, Result};
use crate::learn::baum_welch::{BaumWelch, DEFAULT_N_ITERATIONS};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

///
/// Family of the emission distribution
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpdfKind {
    /// `OpdfGaussian` of real observations
    Gaussian,
    /// `OpdfLogNormal` of real observations
    LogNormal,
    /// `OpdfDiscrete` of symbols `0..n_symbols`
    Discrete { n_symbols: usize },
}

impl OpdfKind {
    ///
    /// `true` if the observations are real numbers, `false` if symbols
    ///
    pub fn is_real(&self) -> bool {
        matches!(self, OpdfKind::Gaussian | OpdfKind::LogNormal)
    }
}

impl Default for OpdfKind {
    fn default() -> Self {
        OpdfKind::Gaussian
    }
}

/// `gaussian`, `lognormal` or `discrete:<n_symbols>`
impl FromStr for OpdfKind {
    type Err = HmmError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gaussian" => Ok(OpdfKind::Gaussian),
            "lognormal" => Ok(OpdfKind::LogNormal),
            _ => match s.strip_prefix("discrete:").map(|n| n.parse::<usize>()) {
                Some(Ok(n_symbols)) if n_symbols > 0 => Ok(OpdfKind::Discrete { n_symbols }),
                _ => Err(HmmError::InvalidParameter(format!(
                    "unknown opdf `{}` (gaussian, lognormal or discrete:<n_symbols>)",
                    s
                ))),
            },
        }
    }
}

impl std::fmt::Display for OpdfKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OpdfKind::Gaussian => write!(f, "gaussian"),
            OpdfKind::LogNormal => write!(f, "lognormal"),
            OpdfKind::Discrete { n_symbols } => write!(f, "discrete:{}", n_symbols),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    /// Number of hidden states
    pub n_states: usize,
    /// Number of Baum-Welch iterations
    pub n_iterations: usize,
    /// Seed of the random generator used in the k-means initialization
    pub seed: u64,
    pub opdf: OpdfKind,
    /// Run Baum-Welch E-step in parallel
    pub parallel: bool,
}

impl Default for LearnConfig {
    fn default() -> Self {
        LearnConfig {
            n_states: 2,
            n_iterations: DEFAULT_N_ITERATIONS,
            seed: 0,
            opdf: OpdfKind::default(),
            parallel: true,
        }
    }
}

impl LearnConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
    pub fn to_json_string(&self) -> String {
        // plain struct of numbers and enums always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
    pub fn baum_welch(&self) -> BaumWelch {
        BaumWelch {
            n_iterations: self.n_iterations,
            parallel: self.parallel,
        }
    }
    pub fn rng(&self) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn config_defaults() {
        let c = LearnConfig::from_json_str("{}").unwrap();
        assert_eq!(c, LearnConfig::default());
        assert_eq!(c.n_iterations, 9);
        assert!(c.parallel);
        let c = LearnConfig::from_json_str(r#"{"n_states": 3, "opdf": "lognormal"}"#).unwrap();
        assert_eq!(c.n_states, 3);
        assert_eq!(c.opdf, OpdfKind::LogNormal);
        assert!(c.opdf.is_real());
        assert!(!OpdfKind::Discrete { n_symbols: 2 }.is_real());
        assert_eq!(c.seed, 0);
    }
    #[test]
    fn config_json_round_trip() {
        let c = LearnConfig {
            n_states: 4,
            n_iterations: 20,
            seed: 7,
            opdf: OpdfKind::Discrete { n_symbols: 5 },
            parallel: false,
        };
        let json = c.to_json_string();
        assert!(json.contains(r#""discrete""#));
        assert_eq!(LearnConfig::from_json_str(&json).unwrap(), c);
        assert_eq!(c.baum_welch().n_iterations, 20);
    }
    #[test]
    fn config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"seed": 3, "parallel": false}"#).unwrap();
        let c = LearnConfig::from_json_file(&path).unwrap();
        assert_eq!(c.seed, 3);
        assert!(!c.parallel);
        assert!(matches!(
            LearnConfig::from_json_str(r#"{"n_states": "x"}"#),
            Err(HmmError::Config(_))
        ));
        assert!(matches!(
            LearnConfig::from_json_file(dir.path().join("missing.json")),
            Err(HmmError::Io(_))
        ));
    }
    #[test_case("gaussian", Some(OpdfKind::Gaussian) ; "gaussian")]
    #[test_case("lognormal", Some(OpdfKind::LogNormal) ; "lognormal")]
    #[test_case("discrete:4", Some(OpdfKind::Discrete { n_symbols: 4 }) ; "discrete")]
    #[test_case("discrete:0", None ; "no symbols")]
    #[test_case("discrete", None ; "symbols missing")]
    #[test_case("poisson", None ; "unknown")]
    fn opdf_kind_from_str(s: &str, expected: Option<OpdfKind>) {
        assert_eq!(s.parse::<OpdfKind>().ok(), expected);
        if let Some(kind) = expected {
            assert_eq!(kind.to_string(), s);
        }
    }
}
