// src/main.rs

use instrument_scatter::demo_scene::{demo_config, demo_scene_for};
use instrument_scatter::engine_lib::IterationOrchestrator;
use instrument_scatter::ScenarioConfig;

const DEFAULT_ITERATIONS: u64 = 3;
const DEFAULT_FRAMES: u32 = 90;
const FRAME_DT: f32 = 1.0 / 30.0;

// Usage: instrument_scatter [config.json] [iterations] [frames]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => ScenarioConfig::from_json_file(&path)?,
        _ => demo_config(),
    };
    let iterations = args.next().map(|s| s.parse()).transpose()?.unwrap_or(DEFAULT_ITERATIONS);
    let frames = args.next().map(|s| s.parse()).transpose()?.unwrap_or(DEFAULT_FRAMES);

    let mut scene = demo_scene_for(&config);
    let mut orchestrator = IterationOrchestrator::new(config)?;

    for _ in 0..iterations {
        let summary = orchestrator.on_iteration_start(&mut scene)?;
        for frame in 0..frames {
            orchestrator.tick(&mut scene, FRAME_DT);
            for reading in orchestrator.joint_readings(&scene) {
                log::debug!(
                    "iter {} frame {frame} slot {} {}: {:.2} deg {:?}",
                    summary.iteration,
                    reading.slot,
                    reading.joint,
                    reading.angle,
                    reading.local_rotation
                );
            }
        }
        orchestrator.on_iteration_end(&mut scene);
    }
    Ok(())
}
