pub mod cli;
pub mod cluster;
pub mod common;
pub mod config;
pub mod error;
pub mod hmm;
pub mod io;
pub mod learn;
pub mod opdf;
pub mod prelude;
pub mod prob;

#[macro_use]
extern crate approx;
