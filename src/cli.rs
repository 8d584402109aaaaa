//!
//! Handlers of the `loghmm` subcommands
//!
//! The observation type of the files depends on the opdf family:
//! real numbers for `gaussian` and `lognormal`, symbols for `discrete`.
//!
use crate::cluster::Centroid;
use crate::config::{LearnConfig, OpdfKind};
use crate::error::Result;
use crate::hmm::Hmm;
use crate::io::model::{load_hmm, save_hmm, to_model_string};
use crate::io::sequence::{load_sequences, to_sequences_string};
use crate::io::{ObservationFormat, OpdfFormat};
use crate::learn::KMeansLearner;
use crate::opdf::{Opdf, OpdfDiscrete, OpdfGaussian, OpdfLogNormal, OpdfReal};
use log::info;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::Write;
use std::path::Path;

///
/// Learn HMM from scratch by the k-means learner, then refine it by
/// `config.n_iterations` Baum-Welch iterations.
///
pub fn kmeans<P: AsRef<Path>, Q: AsRef<Path>>(config: &LearnConfig, seqs: P, output: Q) -> Result<()> {
    match config.opdf {
        OpdfKind::Gaussian => {
            let factory = || OpdfReal::from(OpdfGaussian::default());
            kmeans_with(factory, config, seqs, output)
        }
        OpdfKind::LogNormal => {
            let factory = || OpdfReal::from(OpdfLogNormal::default());
            kmeans_with(factory, config, seqs, output)
        }
        OpdfKind::Discrete { n_symbols } => {
            let template = OpdfDiscrete::uniform(n_symbols)?;
            kmeans_with(move || template.clone(), config, seqs, output)
        }
    }
}

fn kmeans_with<D, F, P, Q>(factory: F, config: &LearnConfig, seqs: P, output: Q) -> Result<()>
where
    D: Opdf + OpdfFormat + Sync,
    D::Observation: Centroid + ObservationFormat + Sync,
    F: Fn() -> D,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let seqs: Vec<Vec<D::Observation>> = load_sequences(seqs)?;
    let mut rng = config.rng();
    let mut learner = KMeansLearner::new(config.n_states, factory, &seqs, &mut rng)?;
    let mut hmm = learner.learn()?;
    if config.n_iterations > 0 {
        hmm = config.baum_welch().learn(&hmm, &seqs)?;
    }
    info!("learned\n{}", hmm);
    save_hmm(output, &hmm)
}

///
/// Refine the HMM in `model` by `config.n_iterations` Baum-Welch iterations.
///
pub fn baum_welch<P, Q, R>(config: &LearnConfig, model: P, seqs: Q, output: R) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let bw = config.baum_welch();
    match config.opdf {
        OpdfKind::Gaussian | OpdfKind::LogNormal => {
            let hmm: Hmm<OpdfReal> = load_hmm(model)?;
            let seqs: Vec<Vec<f64>> = load_sequences(seqs)?;
            save_hmm(output, &bw.learn(&hmm, &seqs)?)
        }
        OpdfKind::Discrete { .. } => {
            let hmm: Hmm<OpdfDiscrete> = load_hmm(model)?;
            let seqs: Vec<Vec<usize>> = load_sequences(seqs)?;
            save_hmm(output, &bw.learn(&hmm, &seqs)?)
        }
    }
}

///
/// Write the Viterbi state sequence and its cost of each sequence, one
/// sequence per line.
///
pub fn viterbi<P, Q, W>(kind: OpdfKind, model: P, seqs: Q, out: &mut W) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    fn run<D, W>(hmm: &Hmm<D>, seqs: &[Vec<D::Observation>], out: &mut W) -> Result<()>
    where
        D: Opdf,
        W: Write,
    {
        for seq in seqs {
            let path = hmm.viterbi(seq)?;
            let states: Vec<String> = path.states.iter().map(|s| s.to_string()).collect();
            writeln!(out, "{}\t{}", path.cost, states.join(" "))?;
        }
        Ok(())
    }
    if kind.is_real() {
        let seqs: Vec<Vec<f64>> = load_sequences(seqs)?;
        run(&load_hmm::<OpdfReal, _>(model)?, &seqs, out)
    } else {
        let seqs: Vec<Vec<usize>> = load_sequences(seqs)?;
        run(&load_hmm::<OpdfDiscrete, _>(model)?, &seqs, out)
    }
}

///
/// Write `ln P(O)` of each sequence, one per line.
///
pub fn likelihood<P, Q, W>(kind: OpdfKind, model: P, seqs: Q, out: &mut W) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    fn run<D, W>(hmm: &Hmm<D>, seqs: &[Vec<D::Observation>], out: &mut W) -> Result<()>
    where
        D: Opdf,
        W: Write,
    {
        for seq in seqs {
            writeln!(out, "{}", hmm.ln_probability(seq)?.to_log_value())?;
        }
        Ok(())
    }
    if kind.is_real() {
        let seqs: Vec<Vec<f64>> = load_sequences(seqs)?;
        run(&load_hmm::<OpdfReal, _>(model)?, &seqs, out)
    } else {
        let seqs: Vec<Vec<usize>> = load_sequences(seqs)?;
        run(&load_hmm::<OpdfDiscrete, _>(model)?, &seqs, out)
    }
}

///
/// Write `n` sequences of `length` sampled from the HMM in the sequence format.
///
pub fn generate<P, W>(kind: OpdfKind, model: P, n: usize, length: usize, seed: u64, out: &mut W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let text = if kind.is_real() {
        let hmm: Hmm<OpdfReal> = load_hmm(model)?;
        to_sequences_string(&hmm.sample_corpus(n, length, &mut rng))
    } else {
        let hmm: Hmm<OpdfDiscrete> = load_hmm(model)?;
        to_sequences_string(&hmm.sample_corpus(n, length, &mut rng))
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

///
/// Write the state graph in dot format.
///
pub fn dot<P: AsRef<Path>, W: Write>(kind: OpdfKind, model: P, out: &mut W) -> Result<()> {
    let dot = if kind.is_real() {
        load_hmm::<OpdfReal, _>(model)?.to_dot()
    } else {
        load_hmm::<OpdfDiscrete, _>(model)?.to_dot()
    };
    writeln!(out, "{}", dot)?;
    Ok(())
}

///
/// Write the model file text of the HMM (normalized formatting).
///
pub fn show<P: AsRef<Path>, W: Write>(kind: OpdfKind, model: P, out: &mut W) -> Result<()> {
    let text = if kind.is_real() {
        let hmm = load_hmm::<OpdfReal, _>(model)?;
        format!("{}\n{}", to_model_string(&hmm), hmm)
    } else {
        let hmm = load_hmm::<OpdfDiscrete, _>(model)?;
        format!("{}\n{}", to_model_string(&hmm), hmm)
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}
