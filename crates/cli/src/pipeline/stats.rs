//! Run statistics and metrics.

use std::time::Duration;

use observability::CrossingMetricsAggregator;

/// Statistics from a counting run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Total sensor samples taken
    pub samples: u64,

    /// Completed steady-state cycles
    pub cycles: u64,

    /// Occupancy when the run ended
    pub final_count: u32,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of sinks that received updates
    pub active_sinks: usize,

    /// Crossing metrics aggregator
    pub crossing_metrics: CrossingMetricsAggregator,
}

impl RunStats {
    /// Confirmed crossings per minute
    pub fn crossings_per_minute(&self) -> f64 {
        let minutes = self.duration.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.crossing_metrics.total_crossings as f64 / minutes
        } else {
            0.0
        }
    }

    /// Sensor samples per second
    #[allow(dead_code)]
    pub fn samples_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.samples as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Run Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples taken: {}", self.samples);
        println!("   ├─ Cycles completed: {}", self.cycles);
        println!("   ├─ Crossings/min: {:.2}", self.crossings_per_minute());
        println!("   ├─ Active sinks: {}", self.active_sinks);
        println!("   └─ Final occupancy: {}", self.final_count);

        let summary = self.crossing_metrics.summary();

        println!("\n📈 Crossing Metrics");
        println!("   ├─ Confirmed crossings: {}", summary.total_crossings);
        println!("   ├─ Entries: {}", summary.entries);
        println!("   ├─ Exits: {}", summary.exits);
        println!(
            "   ├─ Discarded occlusions: {} ({:.2}%)",
            summary.discarded, summary.discard_rate
        );
        println!("   └─ Confirmation attempts: {}", summary.confirm_attempts);

        println!();
    }
}
