//! Scripted source - prearranged reading queue
//!
//! Implements `DistanceSource` over a fixed sequence of readings. Used by
//! tests and demos where the exact read order matters; the engine's sampling
//! schedule is deterministic, so scripting per-side sequences reproduces any
//! crossing scenario exactly.

use std::collections::VecDeque;

use contracts::DistanceSource;
use tracing::trace;

/// Distance source that pops prearranged readings
///
/// Once the script is exhausted, every further measurement returns `idle_cm`
/// (the resting doorway distance).
pub struct ScriptedSource {
    label: String,
    readings: VecDeque<f64>,
    idle_cm: f64,
    max_range_cm: f64,
}

impl ScriptedSource {
    /// Create a scripted source
    ///
    /// `idle_cm` is returned after the script runs out.
    pub fn new(label: impl Into<String>, readings: Vec<f64>, idle_cm: f64) -> Self {
        Self {
            label: label.into(),
            readings: readings.into(),
            idle_cm,
            max_range_cm: 400.0,
        }
    }

    /// Override the sentinel range
    pub fn with_max_range(mut self, max_range_cm: f64) -> Self {
        self.max_range_cm = max_range_cm;
        self
    }

    /// Append further readings to the script
    pub fn push_readings(&mut self, readings: impl IntoIterator<Item = f64>) {
        self.readings.extend(readings);
    }

    /// Readings not yet consumed
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl DistanceSource for ScriptedSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn max_range_cm(&self) -> f64 {
        self.max_range_cm
    }

    fn measure(&mut self) -> f64 {
        let distance_cm = self.readings.pop_front().unwrap_or(self.idle_cm);
        trace!(
            label = %self.label,
            distance_cm,
            remaining = self.readings.len(),
            "scripted measurement"
        );
        distance_cm
    }
}
