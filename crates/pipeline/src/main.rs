//! Obstacle Avoidance Pipeline - Main Entry Point
//!
//! Runs the pipeline over the simulated approach scene and prints one JSON
//! frame report per line on stdout. An optional first argument names a
//! configuration file; `OBSTACLE__*` environment variables override it.

use std::path::PathBuf;

use anyhow::Context;
use pipeline::{init_logging, sim, BrakeController, LoggingAlertSink, ObstaclePipeline, PipelineConfig};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Obstacle Avoidance Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let (actuator, controller) = BrakeController::channel(config.brake_channel_capacity);
    let brake_task = tokio::spawn(controller.run());

    let (scenario, collaborators) = sim::collaborators(&config, Box::new(actuator), Box::new(LoggingAlertSink));
    let mut pipeline = ObstaclePipeline::new(&config, collaborators)?;

    for index in 0..scenario.config().frames {
        let (left, right) = scenario.frame_pair(index);
        let report = pipeline.process_frame(&left, Some(&right));
        println!("{}", serde_json::to_string(&report)?);

        // Let the brake controller drain between frames
        tokio::task::yield_now().await;
    }

    info!(frames = pipeline.frames_processed(), "Simulation finished");
    drop(pipeline);

    let brake = brake_task.await.context("Brake controller panicked")?;
    info!(engaged = brake.engaged, level = brake.level, commands = brake.commands, "Brake controller stopped");

    Ok(())
}
