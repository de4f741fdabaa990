//! Production implementation of SimulationContext using OS entropy.

use crate::SimulationContext;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Production context backed by an entropy-seeded RNG.
///
/// Reseeded on every process start; runs are not reproducible.
pub struct OsContext {
    rng: StdRng,
}

impl OsContext {
    /// Creates a new OsContext seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for OsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationContext for OsContext {
    fn draw_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}
