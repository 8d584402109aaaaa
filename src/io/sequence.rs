//!
//! Observation sequence file
//!
//! One sequence per line, observations separated by `;`.
//! A trailing `;` is allowed and empty lines are ignored.
//!
//! ```text
//! 1.0; 3.0; 478.0;
//! 2.0; 379.0;
//! ```
//!
use super::{read_string, write_string, ObservationFormat};
use crate::error::{HmmError, Result};
use std::path::Path;

pub fn to_sequences_string<O: ObservationFormat, S: AsRef<[O]>>(seqs: &[S]) -> String {
    let mut s = String::new();
    for seq in seqs {
        for o in seq.as_ref() {
            s.push_str(&o.to_field());
            s.push_str("; ");
        }
        s.push('\n');
    }
    s
}

pub fn from_sequences_string<O: ObservationFormat>(text: &str) -> Result<Vec<Vec<O>>> {
    let mut seqs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_suffix(';').unwrap_or(line);
        let seq = line
            .split(';')
            .map(|field| {
                O::from_field(field.trim()).map_err(|message| HmmError::Parse {
                    line: i + 1,
                    message,
                })
            })
            .collect::<Result<Vec<O>>>()?;
        seqs.push(seq);
    }
    Ok(seqs)
}

pub fn save_sequences<O, S, P>(filename: P, seqs: &[S]) -> Result<()>
where
    O: ObservationFormat,
    S: AsRef<[O]>,
    P: AsRef<Path>,
{
    write_string(filename, &to_sequences_string(seqs))?;
    Ok(())
}

pub fn load_sequences<O: ObservationFormat, P: AsRef<Path>>(filename: P) -> Result<Vec<Vec<O>>> {
    from_sequences_string(&read_string(filename)?)
}
