//! Seed generation for shuffling when no explicit seed is configured.

use crate::common::*;

/// A source of shuffle seeds.
pub trait SeedSource {
    fn next_seed(&self) -> u64;
}

/// Draws a seed from the thread-local random generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomSeed;

impl RandomSeed {
    pub const UPPER_BOUND: u64 = 1_000_000;
}

impl SeedSource for RandomSeed {
    fn next_seed(&self) -> u64 {
        rand::thread_rng().gen_range(0..Self::UPPER_BOUND)
    }
}

/// Always yields the same seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u64 {
        self.0
    }
}

impl<F> SeedSource for F
where
    F: Fn() -> u64,
{
    fn next_seed(&self) -> u64 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_sources() {
        assert_eq!(FixedSeed(42).next_seed(), 42);
        assert_eq!((|| 7u64).next_seed(), 7);
        (0..100).for_each(|_| assert!(RandomSeed.next_seed() < RandomSeed::UPPER_BOUND));
    }
}
