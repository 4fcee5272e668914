//! DoorwayBlueprint - top-level deployment configuration schema
//!
//! Everything an installation fixes at deploy time: the sensor pair, detector
//! tuning, and observer sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CrossingDirection, DetectorConfig};

/// Configuration schema version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Top-level deployment blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorwayBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Doorway identity
    pub doorway: DoorwayConfig,

    /// Per-side sensor endpoints
    pub sensors: SensorsConfig,

    /// Detection engine tuning
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Simulated doorway parameters (used only by simulated sources)
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Observer sinks receiving occupancy updates
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Doorway identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorwayConfig {
    /// Installation name (logging only)
    pub name: String,

    /// Free-form location note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// The sensor pair flanking the doorway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsConfig {
    pub left: SensorEndpointConfig,
    pub right: SensorEndpointConfig,
}

/// One side's sensor endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEndpointConfig {
    /// Label used in logs and metrics
    pub label: String,

    /// Which DistanceSource implementation backs this side
    pub source: SourceKind,

    /// Sentinel distance reported on a missed echo (centimetres)
    #[serde(default = "default_max_range_cm")]
    pub max_range_cm: f64,

    /// Source-specific parameters (e.g. replay `path`, `loop`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_max_range_cm() -> f64 {
    400.0
}

/// Distance source implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Deterministic simulated doorway (no hardware required)
    Simulated,
    /// Recorded readings replayed from a JSONL file
    Replay,
}

/// Simulated doorway parameters
///
/// Both simulated sides share one world so scripted transits hit the sensors
/// in the correct order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Resting distance seen by the left sensor (centimetres)
    pub baseline_left_cm: f64,
    /// Resting distance seen by the right sensor (centimetres)
    pub baseline_right_cm: f64,
    /// How far below baseline a body reads while blocking a sensor (centimetres)
    pub body_depth_cm: f64,
    /// How long a transit keeps each side occluded (seconds)
    pub side_dwell_s: f64,
    /// Delay between the first and the second side occluding (seconds)
    pub stagger_s: f64,
    /// Scripted walk-throughs
    #[serde(default)]
    pub transits: Vec<TransitScript>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            baseline_left_cm: 120.0,
            baseline_right_cm: 110.0,
            body_depth_cm: 45.0,
            side_dwell_s: 0.8,
            stagger_s: 0.3,
            transits: Vec::new(),
        }
    }
}

/// One scripted walk through the simulated doorway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitScript {
    /// When the first sensor starts seeing the body (elapsed seconds)
    pub at_s: f64,
    /// Which way the person walks
    pub direction: CrossingDirection,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub name: String,

    pub sink_type: SinkType,

    /// Per-sink queue depth; overflow drops updates instead of blocking
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters (e.g. file `path`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    64
}

/// Sink implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log line per update
    Log,
    /// JSONL record per update
    File,
}
