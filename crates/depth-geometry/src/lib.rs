//! Depth Geometry
//!
//! Turns dense depth into per-object measurements:
//! - Median depth over an object region
//! - Pinhole back-projection of a pixel to a camera-frame point
//! - Fixed-point stereo disparity to depth conversion
//! - Monocular depth from bounding-box height

mod extractor;
mod mono;
mod projection;
mod stereo;

pub use extractor::{median, DepthExtractor};
pub use mono::{MonoDepthConfig, MonoDepthEstimator};
pub use projection::CameraIntrinsics;
pub use stereo::{StereoGeometry, DISPARITY_SCALE};
