//! Coarse object fingerprints

use std::fmt;
use serde::{Deserialize, Serialize};
use perception_types::FusedObject;

/// Cross-frame identity approximation: class plus the bucket holding the
/// bounding-box centre. Lateral motion faster than one bucket per frame
/// breaks continuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId {
    pub class_id: u32,
    pub bucket_x: i64,
    pub bucket_y: i64,
}

impl TrackId {
    pub fn of(obj: &FusedObject, bucket_size_px: f32) -> Self {
        let (cx, cy) = obj.bbox.center();
        Self {
            class_id: obj.class_id,
            bucket_x: (cx / bucket_size_px).floor() as i64,
            bucket_y: (cy / bucket_size_px).floor() as i64,
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.class_id, self.bucket_x, self.bucket_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perception_types::{BoundingBox, Detection, Point3};

    fn object(class_id: u32, x1: f32, y1: f32, x2: f32, y2: f32) -> FusedObject {
        let det = Detection::new(BoundingBox::new(x1, y1, x2, y2).unwrap(), 0.9, class_id, "car");
        FusedObject::from_detection(&det, None, 5.0, Point3::default())
    }

    #[test]
    fn test_bucketing() {
        // centre (150, 200)
        let id = TrackId::of(&object(2, 100.0, 100.0, 200.0, 300.0), 50.0);
        assert_eq!(id, TrackId { class_id: 2, bucket_x: 3, bucket_y: 4 });
        assert_eq!(id.to_string(), "2_3_4");
    }

    #[test]
    fn test_small_motion_same_id() {
        let a = TrackId::of(&object(2, 100.0, 100.0, 200.0, 300.0), 50.0);
        let b = TrackId::of(&object(2, 110.0, 105.0, 210.0, 305.0), 50.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_class_and_bucket_change_id() {
        let a = TrackId::of(&object(2, 100.0, 100.0, 200.0, 300.0), 50.0);
        assert_ne!(a, TrackId::of(&object(0, 100.0, 100.0, 200.0, 300.0), 50.0));
        assert_ne!(a, TrackId::of(&object(2, 160.0, 100.0, 260.0, 300.0), 50.0));
    }
}
