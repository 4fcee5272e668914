//! Configuration validation
//!
//! Rules:
//! - doorway name and sensor labels non-empty, labels distinct
//! - max_range_cm > 0 per side
//! - detector windows/intervals positive, slack non-negative
//! - replay sources carry a `path` parameter
//! - simulation timings positive when a side is simulated
//! - sink names non-empty

use contracts::{ContractError, DoorwayBlueprint, SensorEndpointConfig, Side, SourceKind};

/// Validate a DoorwayBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    validate_doorway(blueprint)?;
    validate_sensor(Side::Left, &blueprint.sensors.left)?;
    validate_sensor(Side::Right, &blueprint.sensors.right)?;
    validate_labels_distinct(blueprint)?;
    validate_detector(blueprint)?;
    validate_simulation(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_doorway(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    if blueprint.doorway.name.is_empty() {
        return Err(ContractError::config_validation(
            "doorway.name",
            "doorway name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_sensor(side: Side, sensor: &SensorEndpointConfig) -> Result<(), ContractError> {
    if sensor.label.is_empty() {
        return Err(ContractError::config_validation(
            format!("sensors.{side}.label"),
            "sensor label cannot be empty",
        ));
    }

    if sensor.max_range_cm <= 0.0 {
        return Err(ContractError::config_validation(
            format!("sensors.{side}.max_range_cm"),
            format!("max_range_cm must be > 0, got {}", sensor.max_range_cm),
        ));
    }

    if sensor.source == SourceKind::Replay && !sensor.params.contains_key("path") {
        return Err(ContractError::config_validation(
            format!("sensors.{side}.params.path"),
            "replay sources require a `path` parameter",
        ));
    }

    Ok(())
}

fn validate_labels_distinct(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    if blueprint.sensors.left.label == blueprint.sensors.right.label {
        return Err(ContractError::config_validation(
            "sensors.right.label",
            "sensor labels must be distinct",
        ));
    }
    Ok(())
}

fn validate_detector(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    let detector = &blueprint.detector;

    if detector.baseline.window == 0 {
        return Err(ContractError::config_validation(
            "detector.baseline.window",
            "baseline window must be >= 1",
        ));
    }
    if detector.baseline.warmup_samples == 0 {
        return Err(ContractError::config_validation(
            "detector.baseline.warmup_samples",
            "warmup_samples must be >= 1",
        ));
    }
    if detector.baseline.warmup_interval_s <= 0.0 {
        return Err(ContractError::config_validation(
            "detector.baseline.warmup_interval_s",
            format!(
                "warmup_interval_s must be > 0, got {}",
                detector.baseline.warmup_interval_s
            ),
        ));
    }

    if detector.threshold.object_width_cm <= 0.0 {
        return Err(ContractError::config_validation(
            "detector.threshold.object_width_cm",
            format!(
                "object_width_cm must be > 0, got {}",
                detector.threshold.object_width_cm
            ),
        ));
    }
    if detector.threshold.outlier_slack_cm < 0.0 {
        return Err(ContractError::config_validation(
            "detector.threshold.outlier_slack_cm",
            format!(
                "outlier_slack_cm must be >= 0, got {}",
                detector.threshold.outlier_slack_cm
            ),
        ));
    }

    if detector.sequencer.confirm_attempts == 0 {
        return Err(ContractError::config_validation(
            "detector.sequencer.confirm_attempts",
            "confirm_attempts must be >= 1",
        ));
    }
    if detector.sequencer.confirm_interval_s <= 0.0 {
        return Err(ContractError::config_validation(
            "detector.sequencer.confirm_interval_s",
            format!(
                "confirm_interval_s must be > 0, got {}",
                detector.sequencer.confirm_interval_s
            ),
        ));
    }
    if detector.sequencer.lockout_s < 0.0 {
        return Err(ContractError::config_validation(
            "detector.sequencer.lockout_s",
            format!("lockout_s must be >= 0, got {}", detector.sequencer.lockout_s),
        ));
    }
    if detector.sequencer.cycle_interval_s <= 0.0 {
        return Err(ContractError::config_validation(
            "detector.sequencer.cycle_interval_s",
            format!(
                "cycle_interval_s must be > 0, got {}",
                detector.sequencer.cycle_interval_s
            ),
        ));
    }

    Ok(())
}

fn validate_simulation(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    let any_simulated = blueprint.sensors.left.source == SourceKind::Simulated
        || blueprint.sensors.right.source == SourceKind::Simulated;
    if !any_simulated {
        return Ok(());
    }

    let sim = &blueprint.simulation;

    if sim.baseline_left_cm <= 0.0 || sim.baseline_right_cm <= 0.0 {
        return Err(ContractError::config_validation(
            "simulation.baseline_left_cm / simulation.baseline_right_cm",
            "simulated baselines must be > 0",
        ));
    }
    if sim.body_depth_cm <= 0.0 {
        return Err(ContractError::config_validation(
            "simulation.body_depth_cm",
            format!("body_depth_cm must be > 0, got {}", sim.body_depth_cm),
        ));
    }
    if sim.side_dwell_s <= 0.0 {
        return Err(ContractError::config_validation(
            "simulation.side_dwell_s",
            format!("side_dwell_s must be > 0, got {}", sim.side_dwell_s),
        ));
    }
    if sim.stagger_s < 0.0 {
        return Err(ContractError::config_validation(
            "simulation.stagger_s",
            format!("stagger_s must be >= 0, got {}", sim.stagger_s),
        ));
    }

    Ok(())
}

fn validate_sinks(blueprint: &DoorwayBlueprint) -> Result<(), ContractError> {
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
    }
    Ok(())
}
