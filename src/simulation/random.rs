//! Random number primitives
//!
//! Every random draw in the simulation goes through [`RandomSource`], so
//! tests can substitute a scripted source and the CLI can seed a run.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Modulus used when rolling commercial events
pub const COMMERCIAL_MODULUS: u32 = 950;

/// Modulus used when rolling health, theft, stock and hacker events
pub const EVENT_MODULUS: u32 = 1000;

/// Uniform random draws used by the generators and the event system
pub trait RandomSource {
    /// Uniform integer in `[0, max_exclusive)`. Returns 0 when `max_exclusive` is 0.
    fn random_int(&mut self, max_exclusive: u32) -> u32;

    /// Uniform float in `[min, max)`
    fn random_float(&mut self, min: f64, max: f64) -> f64;
}

/// Modulo-frequency trigger: draw in `[0, modulus)` and fire when the draw
/// is a multiple of `frequency`. Lower frequencies fire more often.
pub fn roll_frequency(rng: &mut dyn RandomSource, modulus: u32, frequency: u32) -> bool {
    if frequency == 0 {
        return false;
    }
    rng.random_int(modulus) % frequency == 0
}

/// Platform-backed random source, optionally seeded for reproducible runs
#[derive(Debug, Default)]
pub struct GameRng {
    rng: Option<StdRng>,
}

impl GameRng {
    /// Use the thread-local RNG
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Create a seeded RNG for reproducible games
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for GameRng {
    fn random_int(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 {
            return 0;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(0..max_exclusive),
            None => rand::rng().random_range(0..max_exclusive),
        }
    }

    fn random_float(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(min..max),
            None => rand::rng().random_range(min..max),
        }
    }
}
