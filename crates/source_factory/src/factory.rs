//! Source factory - builds the per-side source pair from a blueprint

use std::path::Path;
use std::sync::Arc;

use contracts::{DistanceSource, DoorwayBlueprint, SensorEndpointConfig, Side, SourceKind};
use tracing::{info, instrument};

use crate::{FactoryError, ReplaySource, SimulatedDoorway, SimulatedSource};

/// The built source pair, one per doorway side
pub struct SourcePair {
    pub left: Box<dyn DistanceSource>,
    pub right: Box<dyn DistanceSource>,
}

impl SourcePair {
    /// Borrow the source for one side
    pub fn side_mut(&mut self, side: Side) -> &mut dyn DistanceSource {
        match side {
            Side::Left => self.left.as_mut(),
            Side::Right => self.right.as_mut(),
        }
    }
}

/// Builds `DistanceSource` implementations from blueprint endpoints
pub struct SourceFactory;

impl SourceFactory {
    /// Build both sides from the blueprint
    ///
    /// Simulated sides share one world so scripted transits cross the doorway
    /// coherently. Any construction failure is fatal: the engine must not
    /// start its cycle loop without two functioning sources.
    #[instrument(name = "source_factory_build", skip(blueprint))]
    pub fn build_from_blueprint(blueprint: &DoorwayBlueprint) -> Result<SourcePair, FactoryError> {
        let world = Self::shared_world(blueprint);

        let left = Self::build_side(Side::Left, &blueprint.sensors.left, world.as_ref())?;
        let right = Self::build_side(Side::Right, &blueprint.sensors.right, world.as_ref())?;

        info!(
            left = %left.label(),
            right = %right.label(),
            "distance sources ready"
        );

        Ok(SourcePair { left, right })
    }

    fn shared_world(blueprint: &DoorwayBlueprint) -> Option<Arc<SimulatedDoorway>> {
        let any_simulated = blueprint.sensors.left.source == SourceKind::Simulated
            || blueprint.sensors.right.source == SourceKind::Simulated;

        any_simulated.then(|| {
            Arc::new(SimulatedDoorway::new(
                blueprint.simulation.clone(),
                blueprint.detector.entry_origin,
            ))
        })
    }

    fn build_side(
        side: Side,
        endpoint: &SensorEndpointConfig,
        world: Option<&Arc<SimulatedDoorway>>,
    ) -> Result<Box<dyn DistanceSource>, FactoryError> {
        match endpoint.source {
            SourceKind::Simulated => {
                let world = world.ok_or_else(|| {
                    FactoryError::init(&endpoint.label, "simulated world not constructed")
                })?;
                Ok(Box::new(SimulatedSource::new(
                    &endpoint.label,
                    side,
                    endpoint.max_range_cm,
                    Arc::clone(world),
                )))
            }
            SourceKind::Replay => {
                let path = endpoint
                    .params
                    .get("path")
                    .ok_or_else(|| FactoryError::missing_param(&endpoint.label, "path"))?;
                let loop_playback = endpoint
                    .params
                    .get("loop")
                    .map(|v| v == "true")
                    .unwrap_or(false);

                let source = ReplaySource::load(
                    Path::new(path),
                    side,
                    &endpoint.label,
                    loop_playback,
                    endpoint.max_range_cm,
                )?;
                Ok(Box::new(source))
            }
        }
    }
}
