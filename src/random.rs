//! Injectable random source for stochastic rule acceptance.
//!
//! The engine never touches a global or thread-local generator. Every
//! derivation sequence owns one [`RandomSource`] and threads it into each
//! probability test, so a derivation is reproducible whenever the source is
//! seeded explicitly.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of uniform draws for probability tests.
pub trait RandomSource {
    /// Returns the next draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Adapter exposing any `rand` generator as a [`RandomSource`].
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    /// Wraps an existing generator.
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    /// A `StdRng` seeded from `seed`. Identical seeds yield identical draw
    /// sequences across runs and platforms.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed script of draws, cycling when exhausted.
///
/// Intended for tests that need a specific acceptance pattern without
/// depending on any generator's internal stream.
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Creates a source replaying `draws` in order, wrapping around.
    ///
    /// # Panics
    /// Panics if `draws` is empty.
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "scripted source needs at least one draw");
        Self { draws, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_agree() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn draws_are_unit_interval() {
        let mut source = RngSource::seeded(7);
        for _ in 0..64 {
            let draw = source.next_unit();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn scripted_source_cycles() {
        let mut source = ScriptedSource::new(vec![0.1, 0.9]);
        assert_eq!(source.next_unit(), 0.1);
        assert_eq!(source.next_unit(), 0.9);
        assert_eq!(source.next_unit(), 0.1);
    }

    #[test]
    #[should_panic(expected = "scripted source needs at least one draw")]
    fn scripted_source_rejects_empty_script() {
        let _ = ScriptedSource::new(Vec::new());
    }
}
