//! Bounded multiplicative noise
//!
//! The generator never touches global randomness; every draw goes through a
//! [`NoiseSource`] handed in by the caller. Seeded ChaCha sources make runs
//! reproducible, [`FixedNoise`] replays a scripted sequence.

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait NoiseSource {
    /// Uniform value in `[low, high]`
    fn sample(&mut self, low: f64, high: f64) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        (**self).sample(low, high)
    }
}

/// Noise backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngNoise<R> {
    rng: R,
}

pub type SeededNoise = RngNoise<ChaCha8Rng>;

impl<R: Rng> RngNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngNoise<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Independent stream of the same seed, one per profile in parallel runs
    pub fn stream(seed: u64, index: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(index);
        Self::new(rng)
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RngNoise<ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> NoiseSource for RngNoise<R> {
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        if low == high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays a fixed cyclic sequence, ignoring the requested bounds
#[derive(Debug, Clone)]
pub struct FixedNoise {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedNoise {
    pub fn constant(value: f64) -> Self {
        Self {
            values: vec![value],
            cursor: 0,
        }
    }

    /// Empty input behaves like `constant(1.0)`
    pub fn sequence(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::constant(1.0);
        }
        Self { values, cursor: 0 }
    }

    /// Number of samples handed out so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl NoiseSource for FixedNoise {
    fn sample(&mut self, _low: f64, _high: f64) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
