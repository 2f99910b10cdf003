//! Stereo disparity <-> depth conversion

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use perception_types::{ensure_positive, is_valid_depth, ConfigError, DepthField};

/// Sub-pixel scale of fixed-point block-matcher disparities
pub const DISPARITY_SCALE: f32 = 16.0;

/// Rectified stereo rig geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoGeometry {
    /// Focal length of the rectified pair (pixels)
    pub focal_length_px: f32,
    /// Distance between the optical centres (meters)
    pub baseline_m: f32,
}

impl Default for StereoGeometry {
    fn default() -> Self {
        Self {
            focal_length_px: 700.0,
            baseline_m: 0.12,
        }
    }
}

impl StereoGeometry {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("focal_length", self.focal_length_px as f64)?;
        ensure_positive("baseline", self.baseline_m as f64)?;
        Ok(())
    }

    /// Z = f * B / d; NaN where there is no positive disparity
    pub fn depth_from_disparity(&self, disparity_px: f32) -> f32 {
        if disparity_px > 0.0 {
            self.focal_length_px * self.baseline_m / disparity_px
        } else {
            f32::NAN
        }
    }

    /// d = f * B / Z; zero for invalid depths
    pub fn disparity_from_depth(&self, depth_m: f32) -> f32 {
        if is_valid_depth(depth_m) {
            self.focal_length_px * self.baseline_m / depth_m
        } else {
            0.0
        }
    }

    /// Convert a fixed-point disparity map (value = pixels * 16) to depth
    pub fn depth_field(&self, disparity: &Array2<i16>) -> DepthField {
        DepthField::new(disparity.mapv(|d| self.depth_from_disparity(d as f32 / DISPARITY_SCALE)))
    }

    /// Fixed-point disparity map matching a depth field
    pub fn disparity_map(&self, depth: &DepthField) -> Array2<u16> {
        depth.as_array().mapv(|z| {
            let d = self.disparity_from_depth(z) * DISPARITY_SCALE;
            d.round().clamp(0.0, u16::MAX as f32) as u16
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_from_disparity() {
        let rig = StereoGeometry { focal_length_px: 700.0, baseline_m: 0.12 };
        // 700 * 0.12 / 28 = 3.0
        assert!((rig.depth_from_disparity(28.0) - 3.0).abs() < 1e-5);
        assert!(rig.depth_from_disparity(0.0).is_nan());
        assert!(rig.depth_from_disparity(-1.0).is_nan());
    }

    #[test]
    fn test_fixed_point_map() {
        let rig = StereoGeometry { focal_length_px: 700.0, baseline_m: 0.12 };
        let disparity = Array2::from_shape_vec((1, 3), vec![28 * 16, 0, -16]).unwrap();
        let depth = rig.depth_field(&disparity);
        assert!((depth.get(0, 0).unwrap() - 3.0).abs() < 1e-5);
        assert!(depth.get(0, 1).unwrap().is_nan());
        assert!(depth.get(0, 2).unwrap().is_nan());
    }

    #[test]
    fn test_disparity_map_inverse() {
        let rig = StereoGeometry::default();
        let depth = DepthField::from_vec(1, 2, vec![3.0, f32::NAN]).unwrap();
        let map = rig.disparity_map(&depth);
        assert_eq!(map[[0, 0]], 448);
        assert_eq!(map[[0, 1]], 0);
    }

    #[test]
    fn test_validate_rejects_zero_baseline() {
        let rig = StereoGeometry { focal_length_px: 700.0, baseline_m: 0.0 };
        assert!(rig.validate().is_err());
    }
}
