//! Scripted Crossing Demo
//!
//! Minimal engine-only walkthrough with a logical clock: calibrates against
//! scripted sources, then replays one entry and one exit, printing each
//! confirmed crossing. Useful for seeing the state machine's decisions
//! without any timing or async machinery.
//!
//! Run with: cargo run --bin scripted_crossing

use contracts::{DistanceSource, Side};
use detection_engine::{DoorwayEngine, EngineAction};
use source_factory::ScriptedSource;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut engine = DoorwayEngine::new(Default::default());

    // Warm-up at a 100 cm resting distance, then one entry
    // (right triggers, left confirms) and one exit (left triggers,
    // right confirms)
    let mut left_readings = vec![100.0; 10];
    left_readings.extend([100.0, 65.0, 60.0]);
    let mut left = ScriptedSource::new("left", left_readings, 100.0);

    let mut right_readings = vec![100.0; 10];
    right_readings.extend([70.0, 55.0]);
    let mut right = ScriptedSource::new("right", right_readings, 100.0);

    let mut now = 0.0;
    for _ in 0..100 {
        match engine.next_action(now) {
            EngineAction::Wait { until_s } => now = until_s,
            EngineAction::Sample { side, kind } => {
                let raw_cm = match side {
                    Side::Left => left.measure(),
                    Side::Right => right.measure(),
                };
                println!("t={now:7.3}s  {side:5}  {kind:?}: {raw_cm} cm");

                if let Some(event) = engine.submit(now, side, raw_cm) {
                    println!(
                        ">>> {} confirmed (origin {}, attempt {}), occupancy now {}",
                        event.direction.as_str(),
                        event.origin,
                        event.attempts_used,
                        event.occupancy
                    );
                }
            }
        }

        if engine.crossings() == 2 {
            break;
        }
    }

    println!("final occupancy: {}", engine.occupancy());
}
