//! Occlusion threshold test
//!
//! Encodes "something is now closer than the calibrated empty-doorway distance
//! by at least one body-width". No hysteresis beyond the fixed margin; the
//! sequencer owns re-trigger suppression.

/// Threshold detector parameterized by the minimum body cross-section
#[derive(Debug, Clone, Copy)]
pub struct ThresholdDetector {
    object_width_cm: f64,
}

impl ThresholdDetector {
    /// Create a detector with the given body-width margin
    pub fn new(object_width_cm: f64) -> Self {
        Self { object_width_cm }
    }

    /// True iff the validated distance is at least one body-width below baseline
    #[inline]
    pub fn is_occluded(&self, validated_cm: f64, baseline_cm: f64) -> bool {
        validated_cm <= baseline_cm - self.object_width_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occluded_below_margin() {
        let detector = ThresholdDetector::new(20.0);
        assert!(detector.is_occluded(70.0, 100.0));
    }

    #[test]
    fn test_boundary_is_occluded() {
        let detector = ThresholdDetector::new(20.0);
        assert!(detector.is_occluded(80.0, 100.0));
    }

    #[test]
    fn test_clear_above_margin() {
        let detector = ThresholdDetector::new(20.0);
        assert!(!detector.is_occluded(80.1, 100.0));
        assert!(!detector.is_occluded(100.0, 100.0));
    }

    #[test]
    fn test_monotonic_in_distance() {
        let detector = ThresholdDetector::new(20.0);
        let baseline = 100.0;

        // Decreasing the distance never flips occluded back to clear
        let mut was_occluded = false;
        let mut distance = 120.0;
        while distance >= 0.0 {
            let occluded = detector.is_occluded(distance, baseline);
            if was_occluded {
                assert!(occluded, "occlusion flipped back to clear at {distance}");
            }
            was_occluded = occluded;
            distance -= 0.5;
        }
        assert!(was_occluded);
    }
}
