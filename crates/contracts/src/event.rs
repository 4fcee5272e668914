//! CrossingEvent / OccupancyUpdate - detection engine output
//!
//! Everything a confirmed doorway transit carries across crate boundaries.

use serde::{Deserialize, Serialize};

use crate::Side;

/// Which way a confirmed transit moved the count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    /// A person entered the room; the count was incremented
    Entry,
    /// A person left the room; the count was decremented (floored at zero)
    Exit,
}

impl CrossingDirection {
    /// Lowercase name for logging and metric labels
    pub fn as_str(self) -> &'static str {
        match self {
            CrossingDirection::Entry => "entry",
            CrossingDirection::Exit => "exit",
        }
    }
}

/// A confirmed doorway transit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingEvent {
    /// Entry or exit, per the installation's direction mapping
    pub direction: CrossingDirection,

    /// Side that registered the occlusion first
    pub origin: Side,

    /// Occupancy after applying the crossing
    pub occupancy: u32,

    /// Engine clock (elapsed seconds) at confirmation
    pub confirmed_at_s: f64,

    /// Confirmation polls spent before the opposite side occluded (1-based)
    pub attempts_used: u32,
}

/// Occupancy change handed to observer sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyUpdate {
    /// Monotonic update sequence number (for ordering/diagnostics)
    pub seq: u64,

    /// Occupancy after the change
    pub count: u32,

    /// The crossing that caused it
    pub event: CrossingEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serde_round_trip() {
        let update = OccupancyUpdate {
            seq: 3,
            count: 2,
            event: CrossingEvent {
                direction: CrossingDirection::Entry,
                origin: Side::Right,
                occupancy: 2,
                confirmed_at_s: 12.4,
                attempts_used: 2,
            },
        };

        let json = serde_json::to_string(&update).unwrap();
        let parsed: OccupancyUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 3);
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.event.direction, CrossingDirection::Entry);
        assert_eq!(parsed.event.origin, Side::Right);
    }
}
