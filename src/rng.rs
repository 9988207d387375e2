//! Injected Randomness
//!
//! Selection never touches a global generator. Callers pass anything that
//! yields floats in [0, 1): a closure over a fixed sequence in tests, a
//! seeded ChaCha stream in simulations, or the thread generator in the app.

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws in [0, 1)
pub trait UnitRng {
    fn next_unit(&mut self) -> f64;
}

impl<F: FnMut() -> f64> UnitRng for F {
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Adapter from any `rand::Rng`
#[derive(Debug, Clone)]
pub struct RandSource<R>(pub R);

impl<R: Rng> UnitRng for RandSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

pub type SeededRng = RandSource<ChaCha8Rng>;

impl SeededRng {
    pub fn seeded(seed: u64) -> Self {
        RandSource(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandSource<ThreadRng> {
    pub fn thread() -> Self {
        RandSource(rand::thread_rng())
    }
}

/// Clamp a raw draw into [0, 1)
///
/// Non-finite and negative values map to 0, values at or above 1 map to the
/// largest float below 1.
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    if value >= 1.0 {
        return 1.0 - f64::EPSILON / 2.0;
    }
    value
}

/// Replays a fixed sequence, repeating the last value once exhausted
pub fn sequence(values: Vec<f64>) -> impl FnMut() -> f64 {
    let mut index = 0;
    move || {
        if values.is_empty() {
            return 0.0;
        }
        let value = values.get(index).copied().unwrap_or(values[values.len() - 1]);
        index += 1;
        value
    }
}
