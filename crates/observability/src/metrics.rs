//! Crossing metric collection
//!
//! Records confirmed crossings and dispatch outcomes, and aggregates them in
//! memory for end-of-run summaries.

use contracts::{CrossingDirection, CrossingEvent, Side};
use metrics::{counter, gauge, histogram};

/// Record a confirmed crossing
///
/// Call once per `CrossingEvent` produced by the engine.
///
/// # Example
///
/// ```ignore
/// use observability::record_crossing;
///
/// if let Some(event) = engine.submit(now, side, raw_cm) {
///     record_crossing(&event);
///     // ...
/// }
/// ```
pub fn record_crossing(event: &CrossingEvent) {
    counter!(
        "doorway_counter_crossings_total",
        "direction" => event.direction.as_str()
    )
    .increment(1);

    gauge!("doorway_counter_occupancy").set(event.occupancy as f64);
    histogram!("doorway_counter_confirm_attempts").record(event.attempts_used as f64);
    gauge!("doorway_counter_last_confirmed_at_s").set(event.confirmed_at_s);
}

/// Record an occlusion discarded after an exhausted confirmation window
pub fn record_occlusion_discarded(origin: Side) {
    counter!(
        "doorway_counter_occlusions_discarded_total",
        "side" => origin.as_str()
    )
    .increment(1);
}

/// Crossing metrics aggregator
///
/// Aggregates metrics in memory for statistics and summary output.
#[derive(Debug, Clone, Default)]
pub struct CrossingMetricsAggregator {
    /// Total confirmed crossings
    pub total_crossings: u64,

    /// Confirmed entries
    pub entries: u64,

    /// Confirmed exits
    pub exits: u64,

    /// Occlusions discarded without confirmation
    pub discarded: u64,

    /// Occupancy after the most recent crossing
    pub last_occupancy: u32,

    /// Confirmation attempt statistics
    pub attempt_stats: RunningStats,
}

impl CrossingMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics from a confirmed crossing
    pub fn update(&mut self, event: &CrossingEvent) {
        self.total_crossings += 1;
        match event.direction {
            CrossingDirection::Entry => self.entries += 1,
            CrossingDirection::Exit => self.exits += 1,
        }
        self.last_occupancy = event.occupancy;
        self.attempt_stats.push(event.attempts_used as f64);
    }

    /// Note a discarded occlusion (window exhausted)
    pub fn note_discarded(&mut self) {
        self.discarded += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        let considered = self.total_crossings + self.discarded;
        MetricsSummary {
            total_crossings: self.total_crossings,
            entries: self.entries,
            exits: self.exits,
            discarded: self.discarded,
            discard_rate: if considered > 0 {
                self.discarded as f64 / considered as f64 * 100.0
            } else {
                0.0
            },
            last_occupancy: self.last_occupancy,
            confirm_attempts: StatsSummary::from(&self.attempt_stats),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_crossings: u64,
    pub entries: u64,
    pub exits: u64,
    pub discarded: u64,
    pub discard_rate: f64,
    pub last_occupancy: u32,
    pub confirm_attempts: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Crossing Metrics Summary ===")?;
        writeln!(f, "Total crossings: {}", self.total_crossings)?;
        writeln!(f, "Entries: {}", self.entries)?;
        writeln!(f, "Exits: {}", self.exits)?;
        writeln!(
            f,
            "Discarded occlusions: {} ({:.2}%)",
            self.discarded, self.discard_rate
        )?;
        writeln!(f, "Last occupancy: {}", self.last_occupancy)?;
        writeln!(f, "Confirmation attempts: {}", self.confirm_attempts)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = CrossingMetricsAggregator::new();

        aggregator.update(&CrossingEvent {
            direction: CrossingDirection::Entry,
            origin: Side::Right,
            occupancy: 1,
            confirmed_at_s: 2.0,
            attempts_used: 3,
        });
        aggregator.update(&CrossingEvent {
            direction: CrossingDirection::Exit,
            origin: Side::Left,
            occupancy: 0,
            confirmed_at_s: 9.0,
            attempts_used: 1,
        });
        aggregator.note_discarded();

        assert_eq!(aggregator.total_crossings, 2);
        assert_eq!(aggregator.entries, 1);
        assert_eq!(aggregator.exits, 1);
        assert_eq!(aggregator.discarded, 1);
        assert_eq!(aggregator.last_occupancy, 0);
        assert_eq!(aggregator.attempt_stats.count(), 2);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = CrossingMetricsAggregator::new();
        aggregator.update(&CrossingEvent {
            direction: CrossingDirection::Entry,
            origin: Side::Right,
            occupancy: 1,
            confirmed_at_s: 2.0,
            attempts_used: 2,
        });

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total crossings: 1"));
        assert!(output.contains("Entries: 1"));
        assert!(output.contains("mean=2.000"));
    }
}
