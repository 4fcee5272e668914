//! OccupancySink trait - observer hook for occupancy changes
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, OccupancyUpdate};

/// Occupancy observer trait
///
/// All sink implementations must implement this trait. The engine itself never
/// sees sinks; confirmed crossings are snapshotted into [`OccupancyUpdate`]s
/// and handed off, so sinks run without touching live detection state.
#[trait_variant::make(OccupancySink: Send)]
pub trait LocalOccupancySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receive an occupancy change
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, update: &OccupancyUpdate) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
