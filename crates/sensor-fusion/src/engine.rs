//! Detection, mask and depth fusion

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use depth_geometry::{CameraIntrinsics, DepthExtractor};
use perception_types::{
    ensure_increasing, ensure_range, ConfigError, DepthField, Detection, FusedObject, Mask,
};

/// Accepted obstacle distance band (meters, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthRange {
    pub min_depth_m: f32,
    pub max_depth_m: f32,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            min_depth_m: 0.1,
            max_depth_m: 10.0,
        }
    }
}

impl DepthRange {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range("min_depth", self.min_depth_m as f64, 0.0, f64::MAX)?;
        ensure_increasing(
            "min_depth",
            self.min_depth_m as f64,
            "max_depth",
            self.max_depth_m as f64,
        )
    }

    pub fn contains(&self, depth_m: f32) -> bool {
        self.min_depth_m <= depth_m && depth_m <= self.max_depth_m
    }
}

/// Keep objects whose depth lies in `[min_depth, max_depth]`, preserving order
pub fn filter_by_depth(objects: Vec<FusedObject>, min_depth: f32, max_depth: f32) -> Vec<FusedObject> {
    let range = DepthRange {
        min_depth_m: min_depth,
        max_depth_m: max_depth,
    };
    objects.into_iter().filter(|obj| range.contains(obj.depth_m)).collect()
}

/// Fuses detector output with a dense depth field
pub struct FusionEngine {
    intrinsics: CameraIntrinsics,
    extractor: DepthExtractor,
}

impl FusionEngine {
    /// Create a fusion engine for the (left) camera with `intrinsics`
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        info!(
            fx = intrinsics.fx,
            fy = intrinsics.fy,
            cx = intrinsics.cx,
            cy = intrinsics.cy,
            "Creating fusion engine"
        );
        Self {
            intrinsics,
            extractor: DepthExtractor,
        }
    }

    /// Fuse one frame.
    ///
    /// `masks` is index-aligned with `detections`; detections past the end
    /// of `masks` use their filled bounding box. Detections without any
    /// valid depth sample are dropped.
    pub fn fuse(&self, detections: &[Detection], masks: &[Mask], depth: &DepthField) -> Vec<FusedObject> {
        let (height, width) = depth.dim();

        let fused: Vec<FusedObject> = detections
            .iter()
            .enumerate()
            .filter_map(|(i, det)| {
                let mask = masks
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| Mask::from_bbox(&det.bbox, height, width));
                self.fuse_detection(det, mask, depth)
            })
            .collect();

        let dropped = detections.len() - fused.len();
        if dropped > 0 {
            debug!(dropped, "Detections without valid depth dropped");
            metrics::counter!("fusion_objects_dropped_total").increment(dropped as u64);
        }

        fused
    }

    /// Fuse a single detection with its region mask
    pub fn fuse_detection(&self, det: &Detection, mask: Mask, depth: &DepthField) -> Option<FusedObject> {
        let region_depth = self.extractor.extract(depth, &mask)?;

        // Position is taken at the box centre; its own depth if valid,
        // otherwise the region median
        let (u, v) = det.bbox.center_pixel();
        let center_depth = self
            .extractor
            .extract_pixel(depth, v, u)
            .unwrap_or(region_depth);
        let position = self.intrinsics.back_project(u as f32, v as f32, center_depth)?;

        Some(FusedObject::from_detection(det, Some(mask), region_depth, position))
    }
}
