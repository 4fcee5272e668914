//! Simulated Doorway Demo
//!
//! Runs the full pipeline against the deterministic simulated doorway:
//! two scripted transits (an entry and an exit) walk through the door while
//! the engine calibrates, detects, confirms, and dispatches updates to a
//! log sink. No hardware required.
//!
//! Run with: cargo run --bin simulated_doorway [path/to/doorway.toml]

use std::time::{Duration, Instant};

use config_loader::ConfigLoader;
use contracts::{
    CrossingDirection, DoorwayBlueprint, DoorwayConfig, OccupancyUpdate, SensorEndpointConfig,
    SensorsConfig, SimulationConfig, SinkConfig, SinkType, SourceKind, TransitScript,
};
use detection_engine::{DoorwayEngine, EngineAction};
use dispatcher::create_dispatcher;
use source_factory::SourceFactory;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Simulated Doorway Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a fast-paced demo blueprint
        create_demo_blueprint()
    };

    // ==== Stage 2: Build sources and engine ====
    let mut sources = SourceFactory::build_from_blueprint(&blueprint)?;
    let mut engine = DoorwayEngine::new(blueprint.detector.clone());

    tracing::info!(
        entry_origin = %blueprint.detector.entry_origin,
        transits = blueprint.simulation.transits.len(),
        "Pipeline configured"
    );

    // ==== Stage 3: Setup dispatcher ====
    let (update_tx, update_rx) = mpsc::channel::<OccupancyUpdate>(16);
    let dispatcher = create_dispatcher(blueprint.sinks.clone(), update_rx)?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Stage 4: Run the control loop for both scripted transits ====
    let start = Instant::now();
    let max_runtime = Duration::from_secs(20);
    let target_crossings = blueprint.simulation.transits.len() as u64;

    while engine.crossings() < target_crossings && start.elapsed() < max_runtime {
        let now = start.elapsed().as_secs_f64();
        match engine.next_action(now) {
            EngineAction::Wait { until_s } => {
                let delay = until_s - now;
                if delay > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
            }
            EngineAction::Sample { side, .. } => {
                let raw_cm = sources.side_mut(side).measure();
                let submitted_at = start.elapsed().as_secs_f64();
                if let Some(event) = engine.submit(submitted_at, side, raw_cm) {
                    let update = OccupancyUpdate {
                        seq: engine.crossings(),
                        count: event.occupancy,
                        event,
                    };
                    update_tx.send(update).await?;
                }
            }
        }
    }

    // ==== Stage 5: Shutdown ====
    drop(update_tx);
    let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

    tracing::info!(
        crossings = engine.crossings(),
        occupancy = engine.occupancy(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "Demo finished"
    );

    Ok(())
}

/// Demo blueprint: compressed timings so the run takes a few seconds
fn create_demo_blueprint() -> DoorwayBlueprint {
    let mut blueprint = DoorwayBlueprint {
        version: Default::default(),
        doorway: DoorwayConfig {
            name: "demo-door".into(),
            location: Some("simulated".into()),
        },
        sensors: SensorsConfig {
            left: SensorEndpointConfig {
                label: "left-sim".into(),
                source: SourceKind::Simulated,
                max_range_cm: 400.0,
                params: Default::default(),
            },
            right: SensorEndpointConfig {
                label: "right-sim".into(),
                source: SourceKind::Simulated,
                max_range_cm: 400.0,
                params: Default::default(),
            },
        },
        detector: Default::default(),
        simulation: SimulationConfig {
            baseline_left_cm: 120.0,
            baseline_right_cm: 110.0,
            body_depth_cm: 45.0,
            side_dwell_s: 1.2,
            stagger_s: 0.2,
            transits: vec![
                TransitScript {
                    at_s: 2.0,
                    direction: CrossingDirection::Entry,
                },
                TransitScript {
                    at_s: 6.0,
                    direction: CrossingDirection::Exit,
                },
            ],
        },
        sinks: vec![SinkConfig {
            name: "demo_log".into(),
            sink_type: SinkType::Log,
            queue_capacity: 16,
            params: Default::default(),
        }],
    };

    // Compress detector timings for the demo
    blueprint.detector.baseline.warmup_interval_s = 0.02;
    blueprint.detector.sequencer.confirm_interval_s = 0.05;
    blueprint.detector.sequencer.lockout_s = 1.5;
    blueprint.detector.sequencer.cycle_interval_s = 0.1;

    blueprint
}
