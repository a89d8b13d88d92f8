//! Simulated-work delays and real-time pacing.
//!
//! Delays are opaque non-negative integers in logical time units; call order
//! across actors is unconstrained, so one shared source behind a mutex is
//! enough. Pacing converts logical units into optional real sleeps.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of non-negative integer delays with a configured mean.
pub trait DelaySource: Send + Sync {
    fn next_delay(&self) -> u64;
}

/// Poisson-distributed delays over a seeded RNG.
///
/// Sampled by inverse transform (Knuth): multiply uniforms until the product
/// drops below e^-mean. Fine for the small means used here.
pub struct PoissonDelays {
    limit: f64,
    rng: Mutex<StdRng>,
}

impl PoissonDelays {
    pub fn new(mean: f64) -> Self {
        Self::with_rng(mean, StdRng::from_os_rng())
    }

    pub fn seeded(mean: f64, seed: u64) -> Self {
        Self::with_rng(mean, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mean: f64, rng: StdRng) -> Self {
        Self {
            limit: (-mean).exp(),
            rng: Mutex::new(rng),
        }
    }
}

impl DelaySource for PoissonDelays {
    fn next_delay(&self) -> u64 {
        let mut rng = self.rng.lock().expect("delay rng lock poisoned");
        let mut count: u64 = 0;
        let mut product: f64 = 1.0;
        loop {
            product *= rng.random::<f64>();
            if product <= self.limit {
                return count;
            }
            count += 1;
        }
    }
}

/// Constant delays, for tests.
pub struct FixedDelays(pub u64);

impl DelaySource for FixedDelays {
    fn next_delay(&self) -> u64 {
        self.0
    }
}

/// Real-time pacing: one logical unit sleeps for `unit`. A zero unit makes
/// every sleep instantaneous.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    unit: Duration,
}

impl Pacing {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn sleep(&self, units: u64) {
        if self.unit.is_zero() || units == 0 {
            return;
        }
        let capped = u32::try_from(units).unwrap_or(u32::MAX);
        std::thread::sleep(self.unit.saturating_mul(capped));
    }
}
