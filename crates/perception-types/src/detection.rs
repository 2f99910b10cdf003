//! Detector output

use serde::{Deserialize, Serialize};
use crate::PerceptionError;

/// Axis-aligned bounding box in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Create a bounding box, rejecting empty or inverted boxes
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, PerceptionError> {
        if x2 > x1 && y2 > y1 {
            Ok(Self { x1, y1, x2, y2 })
        } else {
            Err(PerceptionError::InvalidBoundingBox { x1, y1, x2, y2 })
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Sub-pixel centre (x, y)
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Integer centre pixel (column, row).
    ///
    /// Corners are truncated to whole pixels first, then the midpoint is
    /// floored, so the result always lies on the pixel grid.
    pub fn center_pixel(&self) -> (i64, i64) {
        let (x1, y1, x2, y2) = self.pixel_corners();
        ((x1 + x2).div_euclid(2), (y1 + y2).div_euclid(2))
    }

    /// Corners truncated towards zero
    pub fn pixel_corners(&self) -> (i64, i64, i64, i64) {
        (self.x1 as i64, self.y1 as i64, self.x2 as i64, self.y2 as i64)
    }
}

/// Single detector output for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in pixels
    pub bbox: BoundingBox,

    /// Detection confidence (0-1)
    pub confidence: f32,

    /// Detector class index
    pub class_id: u32,

    /// Human readable class label
    pub class_name: String,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32, class_id: u32, class_name: impl Into<String>) -> Self {
        Self {
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
            class_id,
            class_name: class_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_box() {
        assert!(BoundingBox::new(10.0, 10.0, 5.0, 20.0).is_err());
        assert!(BoundingBox::new(10.0, 10.0, 20.0, 10.0).is_err());
        assert!(BoundingBox::new(10.0, 10.0, 20.0, 20.0).is_ok());
    }

    #[test]
    fn test_center_pixel_truncates_then_floors() {
        let bbox = BoundingBox::new(100.7, 100.2, 201.9, 300.0).unwrap();
        // (100 + 201) / 2 = 150, (100 + 300) / 2 = 200
        assert_eq!(bbox.center_pixel(), (150, 200));
        let (cx, cy) = bbox.center();
        assert!((cx - 151.3).abs() < 1e-3);
        assert!((cy - 200.1).abs() < 1e-3);
    }

    #[test]
    fn test_area() {
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 300.0).unwrap();
        assert_eq!(bbox.area(), 20_000.0);
    }

    #[test]
    fn test_confidence_clamped() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(Detection::new(bbox, 1.4, 0, "person").confidence, 1.0);
    }
}
