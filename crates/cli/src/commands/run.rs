//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(entry_origin) = args.entry_origin {
        let side = entry_origin.into();
        info!(entry_origin = %side, "Overriding entry origin from CLI");
        blueprint.detector.entry_origin = side;
    }

    info!(
        doorway = %blueprint.doorway.name,
        left = %blueprint.sensors.left.label,
        right = %blueprint.sensors.right.label,
        entry_origin = %blueprint.detector.entry_origin,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_crossings: if args.max_crossings == 0 {
            None
        } else {
            Some(args.max_crossings)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting control loop...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        crossings = stats.crossing_metrics.total_crossings,
                        final_count = stats.final_count,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Run completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Control loop execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping control loop...");
        }
    }

    info!("Doorway Counter finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::DoorwayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Doorway:");
    println!("  Name: {}", blueprint.doorway.name);
    if let Some(ref location) = blueprint.doorway.location {
        println!("  Location: {}", location);
    }

    println!("\nSensors:");
    println!(
        "  - left: {} ({:?}, max {} cm)",
        blueprint.sensors.left.label,
        blueprint.sensors.left.source,
        blueprint.sensors.left.max_range_cm
    );
    println!(
        "  - right: {} ({:?}, max {} cm)",
        blueprint.sensors.right.label,
        blueprint.sensors.right.source,
        blueprint.sensors.right.max_range_cm
    );

    println!("\nDetector:");
    println!("  Entry origin: {}", blueprint.detector.entry_origin);
    println!(
        "  Object width: {} cm, outlier slack: {} cm",
        blueprint.detector.threshold.object_width_cm,
        blueprint.detector.threshold.outlier_slack_cm
    );
    println!(
        "  Confirm: {} attempts @ {}s, lockout {}s, cycle {}s",
        blueprint.detector.sequencer.confirm_attempts,
        blueprint.detector.sequencer.confirm_interval_s,
        blueprint.detector.sequencer.lockout_s,
        blueprint.detector.sequencer.cycle_interval_s
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
