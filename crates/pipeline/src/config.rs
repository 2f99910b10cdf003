//! Pipeline configuration
//!
//! Layered with the `config` crate: an optional file, then environment
//! variables prefixed `OBSTACLE` with `__` as the section separator
//! (e.g. `OBSTACLE__RISK__DANGER_DISTANCE=1.2`). Every section falls back to
//! its defaults, and the merged result is validated before use.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use alerting::AlertConfig;
use depth_geometry::{CameraIntrinsics, MonoDepthConfig, StereoGeometry};
use perception_types::{ensure_positive, ensure_range, ConfigError};
use risk_assessment::{RiskConfig, RoadRiskConfig};
use sensor_fusion::{DepthRange, RadarConfig};
use ttc_estimator::TtcConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "OBSTACLE";

/// Where per-frame depth comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthMode {
    /// Rectified stereo pair through a stereo engine
    #[default]
    Stereo,
    /// Single camera; depth from bounding-box height
    Mono,
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

/// Simulated approach scene driven by the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub frames: u32,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    /// Obstacle distance at the first frame (meters)
    pub start_distance_m: f64,
    /// Constant closing speed (m/s)
    pub closing_speed_mps: f64,
    pub object_height_m: f64,
    pub object_width_m: f64,
    /// Obstacle offset to the right of the optical axis (meters)
    pub lateral_offset_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 45,
            fps: 10.0,
            width: 640,
            height: 480,
            start_distance_m: 9.0,
            closing_speed_mps: 2.0,
            object_height_m: 1.7,
            object_width_m: 0.6,
            lateral_offset_m: 0.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("simulation.fps", self.fps)?;
        ensure_positive("simulation.width", self.width as f64)?;
        ensure_positive("simulation.height", self.height as f64)?;
        ensure_positive("simulation.start_distance", self.start_distance_m)?;
        ensure_range("simulation.closing_speed", self.closing_speed_mps, 0.0, f64::MAX)?;
        ensure_positive("simulation.object_height", self.object_height_m)?;
        ensure_positive("simulation.object_width", self.object_width_m)?;
        Ok(())
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub depth_mode: DepthMode,
    pub left_camera: CameraIntrinsics,
    pub right_camera: CameraIntrinsics,
    pub stereo: StereoGeometry,
    pub mono: MonoDepthConfig,
    pub depth_range: DepthRange,
    /// Radar association; radar input is used only when enabled
    pub radar_enabled: bool,
    pub radar: RadarConfig,
    pub ttc: TtcConfig,
    pub risk: RiskConfig,
    pub road: RoadRiskConfig,
    pub alerts: AlertConfig,
    /// Bounded capacity of the brake command channel
    pub brake_channel_capacity: usize,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            depth_mode: DepthMode::default(),
            left_camera: CameraIntrinsics::default(),
            right_camera: CameraIntrinsics::default(),
            stereo: StereoGeometry::default(),
            mono: MonoDepthConfig::default(),
            depth_range: DepthRange::default(),
            radar_enabled: true,
            radar: RadarConfig::default(),
            ttc: TtcConfig::default(),
            risk: RiskConfig::default(),
            road: RoadRiskConfig::default(),
            alerts: AlertConfig::default(),
            brake_channel_capacity: 16,
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from an optional file plus `OBSTACLE__*` overrides, then validate.
    ///
    /// A named file must exist; a missing one is a load error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| ConfigError::Load(e.to_string()))?;
        let config: PipelineConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        info!(
            mode = ?config.depth_mode,
            radar = config.radar_enabled,
            source = ?path,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check every component invariant; the first violation wins
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.left_camera.validate()?;
        self.right_camera.validate()?;
        self.stereo.validate()?;
        self.mono.validate()?;
        self.depth_range.validate()?;
        self.radar.validate()?;
        self.ttc.validate()?;
        self.risk.validate()?;
        self.road.validate()?;
        self.alerts.validate()?;
        ensure_positive("brake_channel_capacity", self.brake_channel_capacity as f64)?;
        self.simulation.validate()?;
        Ok(())
    }
}
