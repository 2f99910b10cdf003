//! Pinhole camera model

use serde::{Deserialize, Serialize};
use perception_types::{ensure_positive, is_valid_depth, ConfigError, Point3};

/// Pinhole intrinsics of a rectified camera (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraIntrinsics {
    /// Horizontal focal length
    pub fx: f32,
    /// Vertical focal length
    pub fy: f32,
    /// Principal point x
    pub cx: f32,
    /// Principal point y
    pub cy: f32,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        // 640x480 road camera
        Self {
            fx: 700.0,
            fy: 700.0,
            cx: 320.0,
            cy: 240.0,
        }
    }
}

impl CameraIntrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Read fx, fy, cx, cy from a 3x3 camera matrix
    pub fn from_matrix(k: [[f32; 3]; 3]) -> Self {
        Self::new(k[0][0], k[1][1], k[0][2], k[1][2])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("fx", self.fx as f64)?;
        ensure_positive("fy", self.fy as f64)?;
        Ok(())
    }

    /// Pixel (u, v) at `depth` meters to a camera-frame point.
    ///
    /// `None` for depths that are not strictly positive.
    pub fn back_project(&self, u: f32, v: f32, depth: f32) -> Option<Point3> {
        if !is_valid_depth(depth) {
            return None;
        }
        Some(Point3::new(
            (u - self.cx) * depth / self.fx,
            (v - self.cy) * depth / self.fy,
            depth,
        ))
    }

    /// Camera-frame point to (u, v, depth); `None` behind the camera
    pub fn project(&self, point: &Point3) -> Option<(f32, f32, f32)> {
        if !is_valid_depth(point.z) {
            return None;
        }
        Some((
            self.fx * point.x / point.z + self.cx,
            self.fy * point.y / point.z + self.cy,
            point.z,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_principal_point_on_axis() {
        let k = CameraIntrinsics::default();
        let p = k.back_project(320.0, 240.0, 5.0).unwrap();
        assert_eq!(p, Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_back_project_formula() {
        let k = CameraIntrinsics::new(500.0, 400.0, 300.0, 200.0);
        let p = k.back_project(400.0, 100.0, 2.0).unwrap();
        assert!((p.x - 0.4).abs() < 1e-6);
        assert!((p.y + 0.5).abs() < 1e-6);
        assert_eq!(p.z, 2.0);
    }

    #[test]
    fn test_rejects_non_positive_depth() {
        let k = CameraIntrinsics::default();
        assert!(k.back_project(10.0, 10.0, 0.0).is_none());
        assert!(k.back_project(10.0, 10.0, -1.0).is_none());
        assert!(k.back_project(10.0, 10.0, f32::NAN).is_none());
    }

    #[test]
    fn test_from_matrix() {
        let k = CameraIntrinsics::from_matrix([[700.0, 0.0, 320.0], [0.0, 710.0, 240.0], [0.0, 0.0, 1.0]]);
        assert_eq!(k, CameraIntrinsics::new(700.0, 710.0, 320.0, 240.0));
    }

    #[test]
    fn test_validate() {
        assert!(CameraIntrinsics::default().validate().is_ok());
        assert!(CameraIntrinsics::new(0.0, 700.0, 320.0, 240.0).validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_projection_round_trip(
            x in -20.0f32..20.0,
            y in -5.0f32..5.0,
            z in 0.1f32..80.0,
        ) {
            let k = CameraIntrinsics::new(712.5, 708.0, 318.2, 243.9);
            let point = Point3::new(x, y, z);
            let (u, v, d) = k.project(&point).unwrap();
            let back = k.back_project(u, v, d).unwrap();
            let tol = 1e-4 * (1.0 + x.abs().max(y.abs()).max(z));
            prop_assert!((back.x - x).abs() <= tol);
            prop_assert!((back.y - y).abs() <= tol);
            prop_assert_eq!(back.z, z);
        }
    }
}
