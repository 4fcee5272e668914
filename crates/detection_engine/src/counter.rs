//! Occupancy counter - saturating non-negative count

use contracts::CrossingDirection;

/// Number of occupants, clamped at zero
///
/// Lives for the process lifetime and is mutated only on confirmed crossings.
/// There is no upper bound; decrements below zero saturate.
#[derive(Debug, Default)]
pub struct OccupancyCounter {
    count: u32,
}

impl OccupancyCounter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current occupancy
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Apply a confirmed crossing and return the new count
    pub fn record(&mut self, direction: CrossingDirection) -> u32 {
        self.count = match direction {
            CrossingDirection::Entry => self.count + 1,
            CrossingDirection::Exit => self.count.saturating_sub(1),
        };
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_increments() {
        let mut counter = OccupancyCounter::new();
        assert_eq!(counter.record(CrossingDirection::Entry), 1);
        assert_eq!(counter.record(CrossingDirection::Entry), 2);
    }

    #[test]
    fn test_exit_decrements() {
        let mut counter = OccupancyCounter::new();
        counter.record(CrossingDirection::Entry);
        assert_eq!(counter.record(CrossingDirection::Exit), 0);
    }

    #[test]
    fn test_exit_floors_at_zero() {
        let mut counter = OccupancyCounter::new();
        assert_eq!(counter.record(CrossingDirection::Exit), 0);
        assert_eq!(counter.record(CrossingDirection::Exit), 0);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_never_negative_for_any_sequence() {
        let mut counter = OccupancyCounter::new();
        let sequence = [
            CrossingDirection::Exit,
            CrossingDirection::Entry,
            CrossingDirection::Exit,
            CrossingDirection::Exit,
            CrossingDirection::Exit,
            CrossingDirection::Entry,
        ];

        for direction in sequence {
            counter.record(direction);
            // u32 cannot go negative; the property is that saturation held
            assert!(counter.count() <= 2);
        }
        assert_eq!(counter.count(), 1);
    }
}
