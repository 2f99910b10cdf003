//! Perception Types
//!
//! Data contracts shared by every stage of the obstacle pipeline:
//! - Road camera frames
//! - Detector output (bounding boxes, class, confidence)
//! - Dense depth fields and region masks
//! - Radar returns
//! - Fused, 3D-annotated objects
//! - Configuration validation errors

pub mod depth;
pub mod detection;
pub mod frame;
pub mod object;
pub mod radar;
pub mod validation;

pub use depth::{is_valid_depth, DepthField, Mask};
pub use detection::{BoundingBox, Detection};
pub use frame::VideoFrame;
pub use object::{FusedObject, Point3};
pub use radar::RadarReturn;
pub use validation::{ensure_increasing, ensure_positive, ensure_range, ConfigError};

use thiserror::Error;

/// Errors raised when constructing perception data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerceptionError {
    #[error("Invalid bounding box [{x1}, {y1}, {x2}, {y2}]: x2 > x1 and y2 > y1 required")]
    InvalidBoundingBox { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("Frame buffer has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}
