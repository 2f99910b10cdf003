//! Monocular depth from bounding-box size
//!
//! Fallback for single-camera rigs: an object of known real height `H`
//! imaged `h` pixels tall sits at roughly `f * H / h` meters. Crude, but
//! it lets the rest of the pipeline run unchanged without a stereo pair.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use perception_types::{ensure_positive, BoundingBox, ConfigError, DepthField, Detection};

use crate::stereo::StereoGeometry;

/// Monocular estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonoDepthConfig {
    /// Camera focal length (pixels)
    pub focal_length_px: f32,

    /// Assumed real-world object height (meters); 1.7 is a standing adult
    pub object_height_m: f32,

    /// Depth assigned to pixels outside every detection (meters)
    pub default_depth_m: f32,

    /// Baseline used only to synthesise a compatible disparity map
    pub assumed_baseline_m: f32,
}

impl Default for MonoDepthConfig {
    fn default() -> Self {
        Self {
            focal_length_px: 800.0,
            object_height_m: 1.7,
            default_depth_m: 5.0,
            assumed_baseline_m: 0.12,
        }
    }
}

impl MonoDepthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("mono.focal_length", self.focal_length_px as f64)?;
        ensure_positive("mono.object_height", self.object_height_m as f64)?;
        ensure_positive("mono.default_depth", self.default_depth_m as f64)?;
        ensure_positive("mono.assumed_baseline", self.assumed_baseline_m as f64)?;
        Ok(())
    }
}

/// Similar-triangles depth estimator
pub struct MonoDepthEstimator {
    config: MonoDepthConfig,
}

impl MonoDepthEstimator {
    pub fn new(config: MonoDepthConfig) -> Self {
        Self { config }
    }

    /// Depth of an object of `object_height_m` spanning `bbox`
    pub fn estimate_from_bbox(&self, bbox: &BoundingBox, object_height_m: f32) -> Option<f32> {
        let pixel_height = bbox.height();
        if pixel_height <= 0.0 {
            return None;
        }
        Some(self.config.focal_length_px * object_height_m / pixel_height)
    }

    /// Synthetic depth field: default depth everywhere, each detection's
    /// estimate painted over its (clamped) box. Later detections win overlaps.
    pub fn depth_field(&self, height: usize, width: usize, detections: &[Detection]) -> DepthField {
        let mut field = DepthField::constant(height, width, self.config.default_depth_m);
        for det in detections {
            if let Some(depth) = self.estimate_from_bbox(&det.bbox, self.config.object_height_m) {
                field.fill_region(&det.bbox, depth);
            }
        }
        debug!(detections = detections.len(), "Built monocular depth field");
        field
    }

    /// Depth field plus a fixed-point disparity map for consumers expecting a stereo pair
    pub fn disparity_and_depth(
        &self,
        height: usize,
        width: usize,
        detections: &[Detection],
    ) -> (Array2<u16>, DepthField) {
        let depth = self.depth_field(height, width, detections);
        let rig = StereoGeometry {
            focal_length_px: self.config.focal_length_px,
            baseline_m: self.config.assumed_baseline_m,
        };
        (rig.disparity_map(&depth), depth)
    }
}

impl Default for MonoDepthEstimator {
    fn default() -> Self {
        Self::new(MonoDepthConfig::default())
    }
}
