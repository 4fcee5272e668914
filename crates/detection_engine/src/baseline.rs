//! Per-side baseline filter - fixed-depth ring-buffer moving average
//!
//! Maintains the running sum incrementally: the value falling out of the
//! window is subtracted as the new sample is added, so every update is O(1)
//! with no recomputation over the whole window.

use std::fmt;

use ringbuf::{traits::*, HeapRb};

/// Rolling mean over the most recent `depth` accepted samples
///
/// Invariant: `running_sum` equals the sum of the buffered samples at every
/// point outside an in-progress update. Must only be fed accepted
/// (non-occluded) samples - feeding obstructed readings would drag the
/// baseline toward the obstruction.
pub struct BaselineFilter {
    window: HeapRb<f64>,
    running_sum: f64,
}

impl fmt::Debug for BaselineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaselineFilter")
            .field("len", &self.window.occupied_len())
            .field("capacity", &self.window.capacity().get())
            .field("mean", &self.mean())
            .finish()
    }
}

impl BaselineFilter {
    /// Create a filter with the given window depth
    pub fn new(depth: usize) -> Self {
        Self {
            window: HeapRb::new(depth),
            running_sum: 0.0,
        }
    }

    /// Absorb one accepted sample and return the updated mean
    #[inline]
    pub fn update(&mut self, sample: f64) -> f64 {
        if self.window.is_full() {
            if let Some(oldest) = self.window.try_pop() {
                self.running_sum -= oldest;
            }
        }

        self.running_sum += sample;
        let _ = self.window.try_push(sample);

        self.mean()
    }

    /// Current mean over the buffered samples (0.0 before any sample)
    #[inline]
    pub fn mean(&self) -> f64 {
        let n = self.window.occupied_len();
        if n == 0 {
            0.0
        } else {
            self.running_sum / n as f64
        }
    }

    /// Number of buffered samples
    #[inline]
    pub fn len(&self) -> usize {
        self.window.occupied_len()
    }

    /// Whether no sample has been absorbed yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Whether the window has filled once
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.window.is_full()
    }
}
