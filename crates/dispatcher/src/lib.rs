//! # Dispatcher
//!
//! Occupancy update fan-out.
//!
//! Responsibilities:
//! - Consume `OccupancyUpdate`s from the control loop
//! - Fan-out to multiple observer sinks
//! - Isolate slow sinks so they never stall detection

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{OccupancySink, OccupancyUpdate};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink};
