use std::sync::{Arc, Mutex};

use hub_core::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `StdRng`-backed source; seed it for reproducible sessions.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: StdRng,
}

impl SeededRandom {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn in_range(&mut self, low: u32, high: u32) -> u32 {
        self.inner.random_range(low..=high)
    }
}

/// Handle onto one generator shared by every engine a controller spawns.
#[derive(Debug)]
pub struct SharedRandom<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> SharedRandom<R> {
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }
}

impl<R> Clone for SharedRandom<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RandomSource> RandomSource for SharedRandom<R> {
    fn in_range(&mut self, low: u32, high: u32) -> u32 {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.in_range(low, high)
    }
}
