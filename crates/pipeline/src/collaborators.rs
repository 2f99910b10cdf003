//! External collaborators
//!
//! Everything the pipeline consumes or drives but does not implement:
//! object detection, segmentation, stereo matching, radar, brake actuation
//! and voice output. Backends plug in behind these traits, so the
//! fusion and risk stages never branch on hardware.

use image::GrayImage;
use ndarray::Array2;
use thiserror::Error;
use tracing::info;
use alerting::FiredAlert;
use perception_types::{BoundingBox, DepthField, Detection, Mask, RadarReturn, VideoFrame};

use crate::brake::BrakeCommand;

/// A collaborator failed for this frame
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{component} failed: {reason}")]
pub struct CollaboratorError {
    pub component: &'static str,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(component: &'static str, reason: impl Into<String>) -> Self {
        Self {
            component,
            reason: reason.into(),
        }
    }
}

/// Object detector over a single frame
pub trait Detector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, CollaboratorError>;
}

/// Instance and scene segmentation
pub trait Segmenter {
    /// Object mask for the region inside `bbox`, frame-sized
    fn segment(&mut self, frame: &VideoFrame, bbox: &BoundingBox) -> Result<Mask, CollaboratorError>;

    /// Scene segmentation map used for lane geometry; `None` if unsupported
    fn segment_full_image(&mut self, frame: &VideoFrame) -> Result<Option<GrayImage>, CollaboratorError>;
}

/// Stereo matcher producing fixed-point disparity and metric depth
pub trait StereoEngine {
    fn compute_disparity_and_depth(
        &mut self,
        left: &VideoFrame,
        right: &VideoFrame,
    ) -> Result<(Array2<u16>, DepthField), CollaboratorError>;
}

/// Radar returns available at `now_s`
pub trait RadarSource {
    fn returns(&mut self, now_s: f64) -> Vec<RadarReturn>;
}

/// Brake actuation; must not block the frame loop
pub trait BrakeActuator {
    fn send(&mut self, command: BrakeCommand);
}

/// Voice output for alerts that passed their cooldown
pub trait AlertSink {
    fn announce(&mut self, alert: &FiredAlert);
}

/// Alert sink that writes announcements to the log
#[derive(Debug, Default)]
pub struct LoggingAlertSink;

impl AlertSink for LoggingAlertSink {
    fn announce(&mut self, alert: &FiredAlert) {
        info!(kind = %alert.kind, message = %alert.message, "Voice alert");
    }
}

/// Backends handed to [`crate::ObstaclePipeline::new`]
pub struct Collaborators {
    pub detector: Box<dyn Detector>,
    pub segmenter: Box<dyn Segmenter>,
    /// Required in stereo mode, ignored in mono mode
    pub stereo: Option<Box<dyn StereoEngine>>,
    /// Used only when radar is enabled
    pub radar: Option<Box<dyn RadarSource>>,
    pub brake: Box<dyn BrakeActuator>,
    pub alerts: Box<dyn AlertSink>,
}
