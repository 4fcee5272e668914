//! Detection engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

use crate::Side;

/// Detection engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Baseline tracking configuration
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Occlusion threshold configuration
    #[serde(default)]
    pub threshold: ThresholdConfig,

    /// Direction confirmation configuration
    #[serde(default)]
    pub sequencer: SequencerConfig,

    /// Side whose occlusion-first sequence counts as an entry
    ///
    /// Fixed by installation (which sensor faces the outside), never inferred
    /// at runtime. The opposite origin counts as an exit.
    #[serde(default = "default_entry_origin")]
    pub entry_origin: Side,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            baseline: BaselineConfig::default(),
            threshold: ThresholdConfig::default(),
            sequencer: SequencerConfig::default(),
            entry_origin: default_entry_origin(),
        }
    }
}

fn default_entry_origin() -> Side {
    Side::Right
}

/// Adaptive baseline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Ring buffer depth of the per-side moving average
    pub window: usize,
    /// Warm-up measurement pairs taken before steady-state operation begins
    pub warmup_samples: usize,
    /// Spacing between warm-up measurements (seconds)
    pub warmup_interval_s: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            window: 10,
            warmup_samples: 10,
            warmup_interval_s: 0.05,
        }
    }
}

/// Occlusion threshold configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum plausible body cross-section; a side is occluded when its
    /// validated distance drops this far below its baseline (centimetres)
    pub object_width_cm: f64,
    /// Readings this far above baseline are echo glitches and are clamped
    /// back to the baseline (centimetres)
    pub outlier_slack_cm: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            object_width_cm: 20.0,
            outlier_slack_cm: 20.0,
        }
    }
}

/// Direction confirmation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Maximum polls of the opposite side per confirmation window
    pub confirm_attempts: u32,
    /// Spacing between confirmation polls (seconds)
    pub confirm_interval_s: f64,
    /// Dwell after a confirmed crossing before sampling resumes (seconds)
    pub lockout_s: f64,
    /// Pacing delay between steady-state cycles (seconds)
    pub cycle_interval_s: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            confirm_attempts: 10,
            confirm_interval_s: 0.1,
            lockout_s: 3.0,
            cycle_interval_s: 0.6,
        }
    }
}
