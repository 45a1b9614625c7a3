//! Process-wide random number source.
//!
//! Measurement collapse and agent tie-breaking both draw from this one
//! generator, so seeding it once makes a whole game reproducible. Tests
//! call [`seed`] before anything that measures or breaks ties.

use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

/// Reset the generator to a fixed seed.
pub fn seed(seed: u64) {
    RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(seed));
}

/// Uniform draw in [0, 1).
pub fn random() -> f64 {
    RNG.with(|rng| rng.borrow_mut().gen())
}

/// Shuffle a slice in place.
pub fn shuffle<T>(items: &mut [T]) {
    RNG.with(|rng| items.shuffle(&mut *rng.borrow_mut()));
}

/// Uniform index into a non-empty collection of `len` items.
pub fn pick_index(len: usize) -> usize {
    debug_assert!(len > 0);
    RNG.with(|rng| rng.borrow_mut().gen_range(0..len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_makes_draws_reproducible() {
        seed(42);
        let first: Vec<f64> = (0..4).map(|_| random()).collect();
        seed(42);
        let second: Vec<f64> = (0..4).map(|_| random()).collect();
        assert_eq!(first, second);
    }
}
