//! Heart-rate readings and the short history kept for display.

use std::collections::VecDeque;

use crate::types::Timestamp;

/// One heart-rate reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    /// Beats per minute.
    pub rate: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, rate: f64) -> Self {
        Self { timestamp, rate }
    }
}

/// Bounded history of the most recent accepted samples.
///
/// Oldest samples are dropped once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
    /// Total number of samples ever pushed.
    pushed: u64,
}

impl SampleWindow {
    /// Creates an empty window holding at most `capacity` samples.
    ///
    /// A `capacity` of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            pushed: 0,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.pushed += 1;
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lowest and highest rate currently held, or `None` when empty.
    pub fn rate_range(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, s| match acc {
            None => Some((s.rate, s.rate)),
            Some((lo, hi)) => Some((lo.min(s.rate), hi.max(s.rate))),
        })
    }

    /// Visible x-range for plotting the window.
    ///
    /// `[0, capacity]` until more than `capacity` samples have been pushed,
    /// then a sliding `[pushed - capacity, pushed]`.
    pub fn x_domain(&self) -> (u64, u64) {
        let cap = self.capacity as u64;
        if self.pushed > cap {
            (self.pushed - cap, self.pushed)
        } else {
            (0, cap)
        }
    }
}
