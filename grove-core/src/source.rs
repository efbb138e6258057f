use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{sample::Sample, types::Timestamp};

/// Resting-to-elevated heart-rate band, in BPM.
pub const DEFAULT_RATE_RANGE: RangeInclusive<f64> = 60.0..=120.0;

/// Stand-in for a live heart-rate feed.
///
/// Produces uniformly random rates with a reading counter as the
/// timestamp, starting at 1 and strictly increasing.
#[derive(Debug, Clone)]
pub struct SyntheticSource<R = StdRng> {
    rng: R,
    next_timestamp: Timestamp,
    range: RangeInclusive<f64>,
}

impl SyntheticSource<StdRng> {
    /// Reproducible source for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> SyntheticSource<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            next_timestamp: 1,
            range: DEFAULT_RATE_RANGE,
        }
    }

    /// Overrides the rate band; bounds may be given in either order.
    pub fn with_range(mut self, a: f64, b: f64) -> Self {
        self.range = a.min(b)..=a.max(b);
        self
    }

    pub fn next_sample(&mut self) -> Sample {
        let rate = self.rng.random_range(self.range.clone());
        let sample = Sample::new(self.next_timestamp, rate);
        self.next_timestamp += 1;
        sample
    }
}

impl<R: Rng> Iterator for SyntheticSource<R> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        Some(self.next_sample())
    }
}
