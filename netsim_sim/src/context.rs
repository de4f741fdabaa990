//! Deterministic contexts implementing SimulationContext for testing.

use netsim_env::SimulationContext;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Simulation context backed by a seeded ChaCha8 RNG.
///
/// The same seed replays the same failure rolls and endpoint picks.
pub struct SeededContext {
    /// Master seed for this simulation
    seed: u64,

    /// Deterministic RNG for every draw
    rng: ChaCha8Rng,
}

impl SeededContext {
    /// Creates a new SeededContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl SimulationContext for SeededContext {
    fn draw_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

/// Context that replays a fixed sequence of draws.
///
/// Each scripted value is reduced modulo the requested bound. Once the
/// script runs out, draws continue from a ChaCha8 RNG seeded with
/// `fallback_seed`, so an endpoint resample loop can never spin forever.
pub struct ScriptedContext {
    draws: VecDeque<usize>,
    fallback_seed: u64,
    fallback: ChaCha8Rng,
    consumed: usize,
}

impl ScriptedContext {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self::with_fallback(draws, 0)
    }

    pub fn with_fallback(draws: impl IntoIterator<Item = usize>, fallback_seed: u64) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback_seed,
            fallback: ChaCha8Rng::seed_from_u64(fallback_seed),
            consumed: 0,
        }
    }

    /// Number of scripted draws still queued.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    /// Total draws served so far, scripted or not.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl SimulationContext for ScriptedContext {
    fn draw_index(&mut self, upper: usize) -> usize {
        self.consumed += 1;
        match self.draws.pop_front() {
            Some(value) => value % upper,
            None => self.fallback.gen_range(0..upper),
        }
    }

    fn seed(&self) -> u64 {
        self.fallback_seed
    }
}
