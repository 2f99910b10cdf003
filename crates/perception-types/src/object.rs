//! Fused, 3D-annotated objects

use serde::{Deserialize, Serialize};
use crate::depth::Mask;
use crate::detection::{BoundingBox, Detection};

/// Point in the camera frame (meters): x right, y down, z forward
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance to `other` in the ground (x, z) plane
    pub fn ground_distance(&self, x: f32, z: f32) -> f32 {
        ((self.x - x).powi(2) + (self.z - z).powi(2)).sqrt()
    }
}

/// Detection annotated with depth and 3D position for one frame.
///
/// Has no identity beyond its frame; later stages attach radar and TTC data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedObject {
    /// Bounding box in pixels
    pub bbox: BoundingBox,

    /// Region mask used for depth extraction
    #[serde(skip)]
    pub mask: Option<Mask>,

    /// Object distance (meters)
    pub depth_m: f32,

    /// Bounding-box centre in camera coordinates
    pub position: Point3,

    /// Detection confidence
    pub confidence: f32,

    pub class_id: u32,
    pub class_name: String,

    /// Depth was replaced by an associated radar return
    pub radar_fused: bool,

    /// Associated radar range (meters)
    pub radar_distance_m: Option<f32>,

    /// Associated radar radial velocity (m/s)
    pub radar_velocity_mps: Option<f32>,

    /// Time to collision (seconds)
    pub ttc_s: Option<f32>,

    /// Whether `ttc_s` holds a usable estimate
    pub ttc_valid: bool,
}

impl FusedObject {
    /// Vision-only object derived from a detection
    pub fn from_detection(detection: &Detection, mask: Option<Mask>, depth_m: f32, position: Point3) -> Self {
        Self {
            bbox: detection.bbox,
            mask,
            depth_m,
            position,
            confidence: detection.confidence,
            class_id: detection.class_id,
            class_name: detection.class_name.clone(),
            radar_fused: false,
            radar_distance_m: None,
            radar_velocity_mps: None,
            ttc_s: None,
            ttc_valid: false,
        }
    }
}
