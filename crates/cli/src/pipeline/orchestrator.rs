//! Pipeline orchestrator - coordinates all components.
//!
//! Owns the single sequential control flow: it asks the engine what to do,
//! performs the measurement or sleep, and forwards confirmed crossings to the
//! dispatcher. Shared state is snapshotted into `OccupancyUpdate`s before it
//! crosses the channel, never shared live.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{DoorwayBlueprint, OccupancyUpdate};
use detection_engine::{DoorwayEngine, EngineAction};
use observability::{record_crossing, record_occlusion_discarded};
use source_factory::SourceFactory;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::RunStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The doorway blueprint configuration
    pub blueprint: DoorwayBlueprint,

    /// Maximum number of confirmed crossings to process (None = unlimited)
    pub max_crossings: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Dispatcher channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the control loop to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build distance sources
        info!(doorway = %blueprint.doorway.name, "Building distance sources...");
        let mut sources = SourceFactory::build_from_blueprint(blueprint)
            .context("Failed to build distance sources")?;

        // Configure detection engine
        let mut engine = DoorwayEngine::new(blueprint.detector.clone());
        info!(
            entry_origin = %blueprint.detector.entry_origin,
            object_width_cm = blueprint.detector.threshold.object_width_cm,
            outlier_slack_cm = blueprint.detector.threshold.outlier_slack_cm,
            confirm_attempts = blueprint.detector.sequencer.confirm_attempts,
            "Detection engine configured"
        );

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (update_tx, update_rx) = mpsc::channel::<OccupancyUpdate>(self.config.buffer_size);

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - occupancy updates will be dropped");
        }

        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), update_rx)
            .context("Failed to create dispatcher")?;

        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_sinks, "Dispatcher started");

        let mut stats = RunStats {
            active_sinks,
            ..Default::default()
        };

        let deadline = self.config.timeout.map(|t| start_time + t);
        let max_crossings = self.config.max_crossings;

        info!(max_crossings = ?max_crossings, "Control loop running");

        // The control loop: one logical thread of execution performs sensor
        // reads, filtering, and state transitions in strict cycle order.
        'control: loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    info!("Run timeout reached");
                    break;
                }
            }

            let now = start_time.elapsed().as_secs_f64();
            match engine.next_action(now) {
                EngineAction::Wait { until_s } => {
                    let mut delay = until_s - now;
                    if let Some(deadline) = deadline {
                        let to_deadline =
                            deadline.saturating_duration_since(Instant::now()).as_secs_f64();
                        delay = delay.min(to_deadline);
                    }
                    if delay > 0.0 {
                        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                    }
                }
                EngineAction::Sample { side, .. } => {
                    let raw_cm = sources.side_mut(side).measure();
                    stats.samples += 1;

                    let submitted_at = start_time.elapsed().as_secs_f64();
                    let discarded_before = engine.abandoned();

                    if let Some(event) = engine.submit(submitted_at, side, raw_cm) {
                        record_crossing(&event);
                        stats.crossing_metrics.update(&event);

                        let update = OccupancyUpdate {
                            seq: engine.crossings(),
                            count: event.occupancy,
                            event,
                        };

                        info!(
                            seq = update.seq,
                            occupancy = update.count,
                            direction = update.event.direction.as_str(),
                            "Occupancy update"
                        );

                        if update_tx.send(update).await.is_err() {
                            warn!("Dispatcher channel closed");
                            break 'control;
                        }

                        if let Some(max) = max_crossings {
                            if engine.crossings() >= max {
                                info!(crossings = engine.crossings(), "Reached max crossings limit");
                                break 'control;
                            }
                        }
                    } else if engine.abandoned() > discarded_before {
                        // The confirming poll we just fed exhausted the window;
                        // the origin was the opposite side
                        record_occlusion_discarded(side.opposite());
                        stats.crossing_metrics.note_discarded();
                    }
                }
            }
        }

        // Shutdown
        info!("Shutting down pipeline...");
        drop(update_tx);

        // Wait for dispatcher to flush
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        stats.cycles = engine.cycles();
        stats.final_count = engine.occupancy();
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            cycles = stats.cycles,
            crossings = stats.crossing_metrics.total_crossings,
            final_count = stats.final_count,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
