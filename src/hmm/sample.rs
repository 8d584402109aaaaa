//!
//! Sampling state and observation sequences from the HMM
//!
use super::Hmm;
use crate::common::{State, StateSequence};
use crate::opdf::Opdf;
use crate::prob::Prob;
use rand::prelude::*;

///
/// pick randomly from the choices with its own probability.
///
/// If no choice has a positive probability, the first one is returned.
///
pub fn pick_with_prob<R: Rng + ?Sized, T: Copy>(rng: &mut R, choices: &[(T, Prob)]) -> T {
    match choices.choose_weighted(rng, |item| item.1.to_value()) {
        Ok(choice) => choice.0,
        Err(_) => choices[0].0,
    }
}

impl<D: Opdf> Hmm<D> {
    fn pick_initial<R: Rng + ?Sized>(&self, rng: &mut R) -> State {
        let choices: Vec<(State, Prob)> = self.pi.iter().copied().enumerate().collect();
        pick_with_prob(rng, &choices)
    }
    fn pick_next<R: Rng + ?Sized>(&self, rng: &mut R, state: State) -> State {
        let choices: Vec<(State, Prob)> = self.a.row(state).iter().copied().enumerate().collect();
        pick_with_prob(rng, &choices)
    }
    ///
    /// Generate a state sequence of `length` and the observations emitted
    /// along it.
    ///
    pub fn sample<R: Rng + ?Sized>(
        &self,
        length: usize,
        rng: &mut R,
    ) -> (StateSequence, Vec<D::Observation>) {
        let mut states = Vec::with_capacity(length);
        let mut observations = Vec::with_capacity(length);
        for t in 0..length {
            let state = if t == 0 {
                self.pick_initial(rng)
            } else {
                self.pick_next(rng, states[t - 1])
            };
            observations.push(self.opdf(state).sample(rng));
            states.push(state);
        }
        (states, observations)
    }
    ///
    /// Generate `n` observation sequences of `length`
    ///
    pub fn sample_corpus<R: Rng + ?Sized>(
        &self,
        n: usize,
        length: usize,
        rng: &mut R,
    ) -> Vec<Vec<D::Observation>> {
        (0..n).map(|_| self.sample(length, rng).1).collect()
    }
}
