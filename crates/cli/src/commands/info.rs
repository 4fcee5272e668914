//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    doorway: DoorwayInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    detector: DetectorInfo,
}

#[derive(Serialize)]
struct DoorwayInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Serialize)]
struct SensorInfo {
    side: String,
    label: String,
    source: String,
    max_range_cm: f64,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct DetectorInfo {
    entry_origin: String,
    object_width_cm: f64,
    outlier_slack_cm: f64,
    baseline_window: usize,
    warmup_samples: usize,
    confirm_attempts: u32,
    confirm_interval_s: f64,
    lockout_s: f64,
    cycle_interval_s: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::DoorwayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensors = if args.sensors {
        let make = |side: &str, s: &contracts::SensorEndpointConfig| SensorInfo {
            side: side.to_string(),
            label: s.label.clone(),
            source: format!("{:?}", s.source),
            max_range_cm: s.max_range_cm,
            params: s.params.clone(),
        };
        vec![
            make("left", &blueprint.sensors.left),
            make("right", &blueprint.sensors.right),
        ]
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    let detector = &blueprint.detector;

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        doorway: DoorwayInfo {
            name: blueprint.doorway.name.clone(),
            location: blueprint.doorway.location.clone(),
        },
        sensors,
        sinks,
        detector: DetectorInfo {
            entry_origin: detector.entry_origin.to_string(),
            object_width_cm: detector.threshold.object_width_cm,
            outlier_slack_cm: detector.threshold.outlier_slack_cm,
            baseline_window: detector.baseline.window,
            warmup_samples: detector.baseline.warmup_samples,
            confirm_attempts: detector.sequencer.confirm_attempts,
            confirm_interval_s: detector.sequencer.confirm_interval_s,
            lockout_s: detector.sequencer.lockout_s,
            cycle_interval_s: detector.sequencer.cycle_interval_s,
        },
    }
}

fn print_config_info(blueprint: &contracts::DoorwayBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Doorway Counter Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Doorway info
    println!("🚪 Doorway");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.doorway.name);
    match &blueprint.doorway.location {
        Some(location) => println!("   └─ Location: {}", location),
        None => println!("   └─ Location: (unspecified)"),
    }

    // Sensors
    println!("\n📡 Sensors");
    let sides = [
        ("left", &blueprint.sensors.left),
        ("right", &blueprint.sensors.right),
    ];
    for (i, (side, sensor)) in sides.iter().enumerate() {
        let is_last = i == sides.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.sensors {
            println!(
                "   {} {}: {} ({:?}, max {} cm)",
                prefix, side, sensor.label, sensor.source, sensor.max_range_cm
            );
        } else {
            println!("   {} {}: {}", prefix, side, sensor.label);
        }
    }

    // Detector settings
    let detector = &blueprint.detector;
    println!("\n⚙️  Detector Settings");
    println!("   ├─ Entry origin: {}", detector.entry_origin);
    println!(
        "   ├─ Object width: {} cm",
        detector.threshold.object_width_cm
    );
    println!(
        "   ├─ Outlier slack: {} cm",
        detector.threshold.outlier_slack_cm
    );
    println!(
        "   ├─ Baseline window: {} samples ({} warm-up)",
        detector.baseline.window, detector.baseline.warmup_samples
    );
    println!(
        "   ├─ Confirmation: {} attempts @ {}s",
        detector.sequencer.confirm_attempts, detector.sequencer.confirm_interval_s
    );
    println!("   ├─ Lockout: {}s", detector.sequencer.lockout_s);
    println!("   └─ Cycle interval: {}s", detector.sequencer.cycle_interval_s);

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, queue {})",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}
