//!
//! HMM file
//!
//! ```text
//! Hmm v1.0
//!
//! NbStates 2
//!
//! State
//! Pi 0.5
//! A 0.9 0.1
//! IntegerOPDF [0.7 0.3]
//!
//! State
//! Pi 0.5
//! A 0.2 0.8
//! IntegerOPDF [0.1 0.9]
//! ```
//!
//! Empty lines and lines starting with `#` are ignored.
//!
use super::{read_string, write_string, OpdfFormat};
use crate::error::{HmmError, Result};
use crate::hmm::Hmm;
use crate::opdf::Opdf;
use std::path::Path;

const HEADER: &str = "Hmm v1.0";

///
/// Format HMM into the model file text
///
pub fn to_model_string<D: Opdf + OpdfFormat>(hmm: &Hmm<D>) -> String {
    let mut s = format!("{}\n\nNbStates {}\n", HEADER, hmm.n_states());
    for i in 0..hmm.n_states() {
        s.push_str("\nState\n");
        s.push_str(&format!("Pi {}\n", hmm.pi_value(i)));
        let row: Vec<String> = (0..hmm.n_states())
            .map(|j| hmm.a_value(i, j).to_string())
            .collect();
        s.push_str(&format!("A {}\n", row.join(" ")));
        s.push_str(&hmm.opdf(i).to_line());
        s.push('\n');
    }
    s
}

///
/// Line reader skipping empty lines and comments, keeping line numbers
///
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: text.lines().enumerate(),
            line: 0,
        }
    }
    fn error(&self, message: String) -> HmmError {
        HmmError::Parse {
            line: self.line,
            message,
        }
    }
    ///
    /// Next meaningful line
    ///
    fn next_line(&mut self) -> Result<&'a str> {
        for (i, line) in self.inner.by_ref() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                self.line = i + 1;
                return Ok(line);
            }
        }
        Err(self.error("unexpected end of file".to_string()))
    }
    ///
    /// Next line of the form `keyword rest`, returns `rest`
    ///
    fn expect(&mut self, keyword: &str) -> Result<&'a str> {
        let line = self.next_line()?;
        match line.strip_prefix(keyword) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                Ok(rest.trim())
            }
            _ => Err(self.error(format!("`{}` expected, found `{}`", keyword, line))),
        }
    }
    fn numbers(&self, s: &str) -> Result<Vec<f64>> {
        s.split_whitespace()
            .map(|x| {
                x.parse::<f64>()
                    .map_err(|e| self.error(format!("`{}`: {}", x, e)))
            })
            .collect()
    }
}

///
/// Parse the model file text
///
pub fn from_model_string<D: Opdf + OpdfFormat>(text: &str) -> Result<Hmm<D>> {
    let mut lines = Lines::new(text);
    let header = lines.next_line()?;
    if header != HEADER {
        return Err(lines.error(format!("`{}` expected, found `{}`", HEADER, header)));
    }
    let n_states: usize = {
        let s = lines.expect("NbStates")?;
        s.parse()
            .map_err(|e| lines.error(format!("`{}`: {}", s, e)))?
    };
    if n_states == 0 {
        return Err(HmmError::NoStates);
    }

    let mut pi = Vec::with_capacity(n_states);
    let mut a = Vec::with_capacity(n_states);
    let mut opdfs = Vec::with_capacity(n_states);
    for _ in 0..n_states {
        lines.expect("State")?;
        let rest = lines.expect("Pi")?;
        let p = lines.numbers(rest)?;
        if p.len() != 1 {
            return Err(lines.error(format!("Pi needs 1 number, got {}", p.len())));
        }
        pi.push(p[0]);
        let rest = lines.expect("A")?;
        a.push(lines.numbers(rest)?);
        let line = lines.next_line()?;
        opdfs.push(D::from_line(line).map_err(|message| lines.error(message))?);
    }
    Hmm::new(pi, a, opdfs)
}

pub fn save_hmm<D: Opdf + OpdfFormat, P: AsRef<Path>>(filename: P, hmm: &Hmm<D>) -> Result<()> {
    write_string(filename, &to_model_string(hmm))?;
    Ok(())
}

pub fn load_hmm<D: Opdf + OpdfFormat, P: AsRef<Path>>(filename: P) -> Result<Hmm<D>> {
    from_model_string(&read_string(filename)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::{mock_discrete, mock_gaussian};
    use crate::opdf::{OpdfDiscrete, OpdfGaussian, OpdfLogNormal, OpdfReal};

    #[test]
    fn model_string() {
        let s = to_model_string(&mock_discrete());
        assert!(s.starts_with("Hmm v1.0\n\nNbStates 2\n\nState\nPi "));
        assert!(s.contains("IntegerOPDF [0.7 0.3]"));
        let hmm: Hmm<OpdfDiscrete> = from_model_string(&s).unwrap();
        assert_abs_diff_eq!(hmm.a_value(0, 1), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(hmm.opdf(1).probability(&1), 0.9, epsilon = 1e-12);
    }
    #[test]
    fn model_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaussian.hmm");
        let hmm = mock_gaussian();
        save_hmm(&path, &hmm).unwrap();
        let loaded: Hmm<OpdfGaussian> = load_hmm(&path).unwrap();
        assert_abs_diff_eq!(loaded.pi(0), hmm.pi(0), epsilon = 1e-12);
        assert_abs_diff_eq!(loaded.a(1, 1), hmm.a(1, 1), epsilon = 1e-12);
        assert_eq!(loaded.opdfs(), hmm.opdfs());
    }
    #[test]
    fn model_with_comments_and_mixed_real() {
        let text = "# two real states\nHmm v1.0\nNbStates 2\n\nState\nPi 1\nA 0 1\nGaussianOPDF [0 1]\nState\nPi 0\nA 0.5 0.5\nLogNormalOPDF [1 2]\n";
        let hmm: Hmm<OpdfReal> = from_model_string(text).unwrap();
        assert!(hmm.pi(1).is_zero());
        assert_eq!(
            hmm.opdf(1),
            &OpdfReal::LogNormal(OpdfLogNormal::new(1.0, 2.0).unwrap())
        );
    }
    #[test]
    fn model_parse_errors() {
        let e = from_model_string::<OpdfGaussian>("Hmm v2.0\n").unwrap_err();
        assert!(matches!(e, HmmError::Parse { line: 1, .. }));
        let e = from_model_string::<OpdfGaussian>("Hmm v1.0\nNbStates x\n").unwrap_err();
        assert!(matches!(e, HmmError::Parse { line: 2, .. }));
        let e = from_model_string::<OpdfGaussian>("Hmm v1.0\nNbStates 1\nState\nPi 1\n").unwrap_err();
        assert!(matches!(e, HmmError::Parse { .. }));
        let e = from_model_string::<OpdfGaussian>(
            "Hmm v1.0\nNbStates 1\nState\nPi 1\nA 1\nGaussianOPDF [0 -1]\n",
        )
        .unwrap_err();
        assert!(matches!(e, HmmError::Parse { line: 6, .. }));
        // rows are validated by the model
        let e = from_model_string::<OpdfGaussian>(
            "Hmm v1.0\nNbStates 1\nState\nPi 1\nA 0.5\nGaussianOPDF [0 1]\n",
        )
        .unwrap_err();
        assert!(matches!(e, HmmError::InvalidProbability { .. }));
        assert!(matches!(
            from_model_string::<OpdfGaussian>("Hmm v1.0\nNbStates 0\n"),
            Err(HmmError::NoStates)
        ));
    }
}
