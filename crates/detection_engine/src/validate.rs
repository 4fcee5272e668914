//! Measurement validation - spurious far-reading clamp
//!
//! Raw pulse/range measurements occasionally return an implausibly large
//! distance on reflection loss. Left alone, such a glitch reads as "the
//! object receded" and corrupts the crossing logic; the validator substitutes
//! the side's current baseline instead.

use tracing::trace;

/// How a sample is being taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Calibration warm-up read; validation is disabled (no baseline exists yet)
    Bootstrap,
    /// Steady-state cycle read
    Steady,
    /// Poll of the opposite side inside a confirmation window
    Confirming,
}

impl SampleKind {
    /// Whether the outlier clamp applies to this read
    #[inline]
    pub fn is_checked(self) -> bool {
        !matches!(self, SampleKind::Bootstrap)
    }
}

/// Outlier-rejecting measurement validator
#[derive(Debug, Clone, Copy)]
pub struct MeasurementValidator {
    outlier_slack_cm: f64,
}

impl MeasurementValidator {
    /// Create a validator with the given slack above baseline
    pub fn new(outlier_slack_cm: f64) -> Self {
        Self { outlier_slack_cm }
    }

    /// Validate a raw reading against the side's current baseline
    ///
    /// A checked reading at or above `baseline + slack` is treated as an echo
    /// glitch and the baseline is returned unchanged; everything else passes
    /// through verbatim. Bootstrap reads are never clamped.
    pub fn validate(&self, raw_cm: f64, baseline_cm: f64, kind: SampleKind) -> f64 {
        if kind.is_checked() && raw_cm >= baseline_cm + self.outlier_slack_cm {
            trace!(raw_cm, baseline_cm, "clamped outlier reading to baseline");
            return baseline_cm;
        }
        raw_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glitch_clamps_to_baseline_exactly() {
        let validator = MeasurementValidator::new(20.0);
        assert_eq!(
            validator.validate(9999.0, 100.0, SampleKind::Confirming),
            100.0
        );
    }

    #[test]
    fn test_clamp_boundary_is_inclusive() {
        let validator = MeasurementValidator::new(20.0);
        // Exactly baseline + slack is already a glitch
        assert_eq!(validator.validate(120.0, 100.0, SampleKind::Steady), 100.0);
        // Just below passes through
        assert_eq!(
            validator.validate(119.9, 100.0, SampleKind::Steady),
            119.9
        );
    }

    #[test]
    fn test_zero_slack_still_clamps() {
        let validator = MeasurementValidator::new(0.0);
        assert_eq!(
            validator.validate(100.1, 100.0, SampleKind::Confirming),
            100.0
        );
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let validator = MeasurementValidator::new(20.0);
        let once = validator.validate(500.0, 100.0, SampleKind::Confirming);
        let twice = validator.validate(once, 100.0, SampleKind::Confirming);
        assert_eq!(once, 100.0);
        assert_eq!(twice, 100.0);
    }

    #[test]
    fn test_bootstrap_is_never_clamped() {
        let validator = MeasurementValidator::new(20.0);
        assert_eq!(
            validator.validate(9999.0, 100.0, SampleKind::Bootstrap),
            9999.0
        );
    }

    #[test]
    fn test_near_readings_pass_verbatim() {
        let validator = MeasurementValidator::new(20.0);
        assert_eq!(validator.validate(63.2, 100.0, SampleKind::Steady), 63.2);
    }
}
