//! Simulated doorway - deterministic two-sided distance simulation
//!
//! Both sides share one `SimulatedDoorway` world so scripted transits hit the
//! sensors in the correct order: the first side occludes at `at_s`, the
//! opposite side `stagger_s` later, and each stays occluded for
//! `side_dwell_s`. Used for development and demos without hardware.

use std::sync::Arc;
use std::time::Instant;

use contracts::{CrossingDirection, DistanceSource, Side, SimulationConfig};
use tracing::{debug, trace};

/// Small deterministic ripple so baselines are not perfectly flat
const JITTER_AMPLITUDE_CM: f64 = 0.4;
const JITTER_FREQUENCY_HZ: f64 = 1.3;

/// Shared simulated doorway world
///
/// Immutable after construction; both side handles sample it against the same
/// start instant.
pub struct SimulatedDoorway {
    config: SimulationConfig,
    /// Side a person blocks first when entering (installation mapping)
    entry_first: Side,
    started: Instant,
}

impl SimulatedDoorway {
    /// Create a simulated doorway
    ///
    /// `entry_first` is the side an entering person occludes first - the same
    /// side the detector's `entry_origin` names.
    pub fn new(config: SimulationConfig, entry_first: Side) -> Self {
        debug!(
            baseline_left_cm = config.baseline_left_cm,
            baseline_right_cm = config.baseline_right_cm,
            transits = config.transits.len(),
            entry_first = %entry_first,
            "simulated doorway created"
        );

        Self {
            config,
            entry_first,
            started: Instant::now(),
        }
    }

    /// Sample one side at the current wall-clock offset
    pub fn sample(&self, side: Side) -> f64 {
        self.sample_at(side, self.started.elapsed().as_secs_f64())
    }

    /// Sample one side at an explicit elapsed time (deterministic)
    pub fn sample_at(&self, side: Side, elapsed_s: f64) -> f64 {
        let baseline = self.baseline(side);

        if self.is_blocked(side, elapsed_s) {
            return baseline - self.config.body_depth_cm;
        }

        baseline + JITTER_AMPLITUDE_CM * (elapsed_s * JITTER_FREQUENCY_HZ).sin()
    }

    fn baseline(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.config.baseline_left_cm,
            Side::Right => self.config.baseline_right_cm,
        }
    }

    fn is_blocked(&self, side: Side, elapsed_s: f64) -> bool {
        let dwell = self.config.side_dwell_s;
        let stagger = self.config.stagger_s;

        self.config.transits.iter().any(|transit| {
            let first = self.first_side(transit.direction);
            let start = if side == first {
                transit.at_s
            } else {
                transit.at_s + stagger
            };
            elapsed_s >= start && elapsed_s <= start + dwell
        })
    }

    fn first_side(&self, direction: CrossingDirection) -> Side {
        match direction {
            CrossingDirection::Entry => self.entry_first,
            CrossingDirection::Exit => self.entry_first.opposite(),
        }
    }
}

/// One side's handle onto the shared simulated doorway
pub struct SimulatedSource {
    label: String,
    side: Side,
    max_range_cm: f64,
    world: Arc<SimulatedDoorway>,
}

impl SimulatedSource {
    /// Create a handle for one side
    pub fn new(
        label: impl Into<String>,
        side: Side,
        max_range_cm: f64,
        world: Arc<SimulatedDoorway>,
    ) -> Self {
        Self {
            label: label.into(),
            side,
            max_range_cm,
            world,
        }
    }
}

impl DistanceSource for SimulatedSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn max_range_cm(&self) -> f64 {
        self.max_range_cm
    }

    fn measure(&mut self) -> f64 {
        let distance_cm = self.world.sample(self.side).min(self.max_range_cm);
        trace!(label = %self.label, side = %self.side, distance_cm, "simulated measurement");
        distance_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TransitScript;

    fn world_with_entry_at(at_s: f64) -> SimulatedDoorway {
        let config = SimulationConfig {
            baseline_left_cm: 120.0,
            baseline_right_cm: 110.0,
            body_depth_cm: 45.0,
            side_dwell_s: 0.8,
            stagger_s: 0.3,
            transits: vec![TransitScript {
                at_s,
                direction: CrossingDirection::Entry,
            }],
        };
        // Entry-first side is Right, matching the default direction mapping
        SimulatedDoorway::new(config, Side::Right)
    }

    #[test]
    fn test_resting_distance_near_baseline() {
        let world = world_with_entry_at(100.0);

        let left = world.sample_at(Side::Left, 1.0);
        let right = world.sample_at(Side::Right, 1.0);

        assert!((left - 120.0).abs() <= JITTER_AMPLITUDE_CM);
        assert!((right - 110.0).abs() <= JITTER_AMPLITUDE_CM);
    }

    #[test]
    fn test_entry_blocks_entry_first_side_first() {
        let world = world_with_entry_at(5.0);

        // At transit start only the entry-first side (right) is blocked
        assert_eq!(world.sample_at(Side::Right, 5.1), 110.0 - 45.0);
        assert!(world.sample_at(Side::Left, 5.1) > 100.0);

        // After the stagger both sides read occluded
        assert_eq!(world.sample_at(Side::Left, 5.4), 120.0 - 45.0);
        assert_eq!(world.sample_at(Side::Right, 5.4), 110.0 - 45.0);
    }

    #[test]
    fn test_doorway_clears_after_dwell() {
        let world = world_with_entry_at(5.0);

        // Right window is [5.0, 5.8], left window is [5.3, 6.1]
        assert!(world.sample_at(Side::Right, 6.0) > 100.0);
        assert!(world.sample_at(Side::Left, 6.2) > 100.0);
    }

    #[test]
    fn test_exit_blocks_opposite_side_first() {
        let config = SimulationConfig {
            transits: vec![TransitScript {
                at_s: 2.0,
                direction: CrossingDirection::Exit,
            }],
            ..SimulationConfig::default()
        };
        let world = SimulatedDoorway::new(config, Side::Right);

        // Exits start on the left when entries start on the right
        assert_eq!(world.sample_at(Side::Left, 2.1), 120.0 - 45.0);
        assert!(world.sample_at(Side::Right, 2.1) > 100.0);
    }
}
