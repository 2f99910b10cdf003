//! Obstacle Avoidance Pipeline
//!
//! Wires the perception stages into one frame-synchronous loop:
//! detections + masks + depth -> fusion -> depth filter -> radar
//! association -> TTC -> collision risk -> brake, with road-condition risk
//! computed alongside and both risks gated through alert cooldowns.
//!
//! Detectors, segmenters, stereo engines, radar, brake actuation and voice
//! output are collaborators behind the traits in [`collaborators`].

pub mod brake;
pub mod collaborators;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sim;

pub use brake::{BrakeCommand, BrakeController, BrakeState, ChannelBrakeActuator};
pub use collaborators::{
    AlertSink, BrakeActuator, CollaboratorError, Collaborators, Detector, LoggingAlertSink, RadarSource,
    Segmenter, StereoEngine,
};
pub use config::{DepthMode, LoggingConfig, PipelineConfig, SimulationConfig};
pub use logging::init_logging;
pub use pipeline::{DepthSource, ObstaclePipeline};
pub use report::FrameReport;

use thiserror::Error;

/// Errors surfaced while building or running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] perception_types::ConfigError),

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}
