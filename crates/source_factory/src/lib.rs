//! # Source Factory
//!
//! Builds the per-side [`DistanceSource`](contracts::DistanceSource) pair from
//! a `DoorwayBlueprint`.
//!
//! Implementations:
//! - `SimulatedSource`: deterministic simulated doorway, no hardware required
//! - `ReplaySource`: recorded readings replayed from a JSONL file
//! - `ScriptedSource`: prearranged reading queue for tests and demos
//!
//! Hardware-backed sources (timed echo pulses, digital range modules) plug in
//! by implementing the same trait downstream; the factory and engine never
//! change for them.

mod error;
mod factory;
mod replay;
mod scripted;
mod simulated;

pub use error::FactoryError;
pub use factory::{SourceFactory, SourcePair};
pub use replay::{ReadingRecord, ReplaySource};
pub use scripted::ScriptedSource;
pub use simulated::{SimulatedDoorway, SimulatedSource};
