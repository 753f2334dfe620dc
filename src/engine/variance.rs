//! Bounded randomness for the recommendation engine
//!
//! The engine never touches an RNG directly; it asks a `VarianceSource` for
//! one `Variance` draw per call so tests can pin the result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Maximum relative jitter applied to the application rate
pub const RATE_JITTER: f64 = 0.05;

/// Maximum absolute jitter applied to the confidence score
pub const CONFIDENCE_JITTER: f64 = 4.0;

/// One draw of jitter values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Variance {
    /// Relative rate change in [-0.05, 0.05]
    pub rate_jitter: f64,
    /// Confidence offset in [-4, 4]
    pub confidence_jitter: f64,
}

impl Variance {
    /// No jitter at all
    pub const NONE: Variance = Variance {
        rate_jitter: 0.0,
        confidence_jitter: 0.0,
    };

    /// Build a variance, clamping both components into their bounds
    pub fn bounded(rate_jitter: f64, confidence_jitter: f64) -> Self {
        Self {
            rate_jitter: rate_jitter.clamp(-RATE_JITTER, RATE_JITTER),
            confidence_jitter: confidence_jitter.clamp(-CONFIDENCE_JITTER, CONFIDENCE_JITTER),
        }
    }

    /// Draw uniformly from any RNG
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            rate_jitter: rng.gen_range(-RATE_JITTER..RATE_JITTER),
            confidence_jitter: rng.gen_range(-CONFIDENCE_JITTER..CONFIDENCE_JITTER),
        }
    }
}

/// Source of per-call variance
pub trait VarianceSource: Send + Sync {
    fn draw(&self) -> Variance;
}

/// Thread-local RNG, independently seeded per thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngVariance;

impl VarianceSource for ThreadRngVariance {
    fn draw(&self) -> Variance {
        Variance::sample(&mut rand::thread_rng())
    }
}

/// Always returns the same variance
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedVariance(pub Variance);

impl FixedVariance {
    pub fn none() -> Self {
        Self(Variance::NONE)
    }
}

impl VarianceSource for FixedVariance {
    fn draw(&self) -> Variance {
        self.0
    }
}

/// Reproducible sequence from a seed
pub struct SeededVariance {
    rng: Mutex<StdRng>,
}

impl SeededVariance {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl VarianceSource for SeededVariance {
    fn draw(&self) -> Variance {
        match self.rng.lock() {
            Ok(mut rng) => Variance::sample(&mut *rng),
            // A poisoned lock only means another caller panicked mid-draw
            Err(poisoned) => Variance::sample(&mut *poisoned.into_inner()),
        }
    }
}
