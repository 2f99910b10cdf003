//! Sensor Fusion
//!
//! Combines per-frame perception outputs into 3D obstacles:
//! - Detector boxes + segmentation masks + depth field -> fused objects
//! - Depth range filtering
//! - Nearest-neighbour association with forward radar returns

mod engine;
mod radar;

pub use engine::{filter_by_depth, DepthRange, FusionEngine};
pub use radar::{RadarAssociator, RadarConfig};
