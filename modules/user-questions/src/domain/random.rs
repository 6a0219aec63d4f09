//! Injected randomness for seeding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::model::Visibility;

/// Every random decision the seed generator makes.
pub trait RandomSource: Send {
    /// Uniform pick between the default visibilities.
    fn pick_visibility(&mut self) -> Visibility;

    /// `true` with probability one half.
    fn coin_flip(&mut self) -> bool;

    /// Random (version 4) UUID used to build unique emails.
    fn uuid(&mut self) -> Uuid;
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug)]
pub struct RngSource<R> {
    rng: R,
}

impl<R> RngSource<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Reproducible sequence for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn pick_visibility(&mut self) -> Visibility {
        Visibility::ALL[self.rng.random_range(0..Visibility::ALL.len())]
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}
