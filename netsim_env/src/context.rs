//! Core environment context trait for the simulator.

/// The central interface for random draws.
///
/// The simulation never touches a random number generator directly. It asks
/// the context, which lets a test harness substitute a seeded or scripted
/// source and replay a run draw for draw.
///
/// # Implementations
///
/// - **Production**: `OsContext` - entropy-seeded `StdRng`
/// - **Simulation**: `SeededContext` (ChaCha8 from a 64-bit seed) and
///   `ScriptedContext` (fixed draw sequence), both in `netsim_sim`
pub trait SimulationContext {
    /// Returns a uniformly distributed index in `0..upper`.
    ///
    /// `upper` must be non-zero; callers check for empty pools first.
    fn draw_index(&mut self, upper: usize) -> usize;

    /// Rolls a die with `sides` faces, returning a value in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32 {
        self.draw_index(sides as usize) as u32 + 1
    }

    /// Picks a uniformly random element of `pool`, or `None` if it is empty.
    fn choose<'a, T>(&mut self, pool: &'a [T]) -> Option<&'a T> {
        if pool.is_empty() {
            return None;
        }
        let index = self.draw_index(pool.len());
        pool.get(index)
    }

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not reproducible).
    fn seed(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts upward, wrapping at `upper`.
    struct Counter(usize);

    impl SimulationContext for Counter {
        fn draw_index(&mut self, upper: usize) -> usize {
            let value = self.0 % upper;
            self.0 += 1;
            value
        }

        fn seed(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_roll_is_one_based() {
        let mut ctx = Counter(0);
        assert_eq!(ctx.roll(5), 1);
        assert_eq!(ctx.roll(5), 2);

        let mut ctx = Counter(4);
        assert_eq!(ctx.roll(5), 5);
    }

    #[test]
    fn test_choose_empty_pool() {
        let mut ctx = Counter(0);
        let pool: [u8; 0] = [];
        assert!(ctx.choose(&pool).is_none());
    }

    #[test]
    fn test_choose_uses_draw() {
        let mut ctx = Counter(2);
        let pool = ["a", "b", "c", "d"];
        assert_eq!(ctx.choose(&pool), Some(&"c"));
        assert_eq!(ctx.choose(&pool), Some(&"d"));
    }
}
