//!
//! Text formats of HMM and observation sequences
//!
//! * `model`: HMM file (`Hmm v1.0` format)
//! * `sequence`: observation sequences, one sequence per line
//!
pub mod model;
pub mod sequence;

use crate::error::Result;
use crate::opdf::{OpdfDiscrete, OpdfGaussian, OpdfLogNormal, OpdfReal};
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

///
/// write string into a file
///
pub fn write_string<P: AsRef<Path>>(filename: P, string: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(string.as_bytes())?;
    Ok(())
}

///
/// read whole file into a string
///
pub fn read_string<P: AsRef<Path>>(filename: P) -> Result<String> {
    let mut file = File::open(filename)?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(s)
}

///
/// Opdf that can be written as a line of the model file
///
/// ```text
/// GaussianOPDF [mean variance]
/// LogNormalOPDF [mean variance]
/// IntegerOPDF [p0 p1 ...]
/// ```
///
pub trait OpdfFormat: Sized {
    fn to_line(&self) -> String;
    fn from_line(line: &str) -> std::result::Result<Self, String>;
}

///
/// Observation that can be written as a field of the sequence file
///
pub trait ObservationFormat: Sized {
    fn to_field(&self) -> String;
    fn from_field(field: &str) -> std::result::Result<Self, String>;
}

///
/// Parse `keyword [x0 x1 ...]` into the numbers
///
fn parse_bracketed(line: &str, keyword: &str) -> std::result::Result<Vec<f64>, String> {
    let rest = line
        .trim()
        .strip_prefix(keyword)
        .ok_or_else(|| format!("`{}` expected", keyword))?
        .trim();
    let inner = rest
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| format!("`{} [...]` expected", keyword))?;
    inner
        .split_whitespace()
        .map(|x| x.parse::<f64>().map_err(|e| format!("`{}`: {}", x, e)))
        .collect()
}

fn format_bracketed(keyword: &str, xs: &[f64]) -> String {
    let xs: Vec<String> = xs.iter().map(|x| x.to_string()).collect();
    format!("{} [{}]", keyword, xs.join(" "))
}

fn parse_two(line: &str, keyword: &str) -> std::result::Result<(f64, f64), String> {
    match parse_bracketed(line, keyword)?.as_slice() {
        &[mean, variance] => Ok((mean, variance)),
        xs => Err(format!("{} needs 2 numbers, got {}", keyword, xs.len())),
    }
}

impl OpdfFormat for OpdfGaussian {
    fn to_line(&self) -> String {
        format_bracketed("GaussianOPDF", &[self.mean(), self.variance()])
    }
    fn from_line(line: &str) -> std::result::Result<Self, String> {
        let (mean, variance) = parse_two(line, "GaussianOPDF")?;
        OpdfGaussian::new(mean, variance).map_err(|e| e.to_string())
    }
}

impl OpdfFormat for OpdfLogNormal {
    fn to_line(&self) -> String {
        format_bracketed("LogNormalOPDF", &[self.mean(), self.variance()])
    }
    fn from_line(line: &str) -> std::result::Result<Self, String> {
        let (mean, variance) = parse_two(line, "LogNormalOPDF")?;
        OpdfLogNormal::new(mean, variance).map_err(|e| e.to_string())
    }
}

impl OpdfFormat for OpdfDiscrete {
    fn to_line(&self) -> String {
        format_bracketed("IntegerOPDF", self.probs())
    }
    fn from_line(line: &str) -> std::result::Result<Self, String> {
        let probs = parse_bracketed(line, "IntegerOPDF")?;
        OpdfDiscrete::new(probs).map_err(|e| e.to_string())
    }
}

impl OpdfFormat for OpdfReal {
    fn to_line(&self) -> String {
        match self {
            OpdfReal::Gaussian(d) => d.to_line(),
            OpdfReal::LogNormal(d) => d.to_line(),
        }
    }
    fn from_line(line: &str) -> std::result::Result<Self, String> {
        if line.trim_start().starts_with("LogNormalOPDF") {
            Ok(OpdfLogNormal::from_line(line)?.into())
        } else {
            Ok(OpdfGaussian::from_line(line)?.into())
        }
    }
}

impl ObservationFormat for f64 {
    fn to_field(&self) -> String {
        self.to_string()
    }
    fn from_field(field: &str) -> std::result::Result<Self, String> {
        field
            .parse()
            .map_err(|e| format!("`{}` is not a real number: {}", field, e))
    }
}

impl ObservationFormat for usize {
    fn to_field(&self) -> String {
        self.to_string()
    }
    fn from_field(field: &str) -> std::result::Result<Self, String> {
        field
            .parse()
            .map_err(|e| format!("`{}` is not a symbol: {}", field, e))
    }
}
