//! # Detection Engine
//!
//! The occupancy-detection core: per-side adaptive baselines, outlier-clamped
//! measurement validation, threshold-crossing detection, and the two-sensor
//! direction-confirmation state machine with debounce.
//!
//! The engine is synchronous and owns no clock or sensors. The driver asks
//! [`DoorwayEngine::next_action`] what to do, performs the measurement or
//! sleep itself, and feeds readings back through [`DoorwayEngine::submit`].
//! That keeps every timing window (confirmation polls, lockout, cycle pacing)
//! an explicit deadline instead of a buried sleep, so the same state machine
//! runs under a tokio loop, a test harness, or a cooperative scheduler.

mod baseline;
mod counter;
mod engine;
mod threshold;
mod validate;

pub use baseline::BaselineFilter;
pub use counter::OccupancyCounter;
pub use engine::{DoorwayEngine, EngineAction};
pub use threshold::ThresholdDetector;
pub use validate::{MeasurementValidator, SampleKind};
