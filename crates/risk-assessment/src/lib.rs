//! Risk Assessment
//!
//! Two independent per-frame assessments:
//! - Collision risk from the nearest obstacle (level, score, brake decision)
//! - Road-condition risk from image statistics and detection density
//!   (low visibility, wet road, curve, narrow road)

mod assessor;
mod config;
mod lines;
mod road;
mod statistics;

pub use assessor::{NearestObject, ObjectRisk, RiskAssessor, RiskLevel, RiskResult};
pub use config::{RiskConfig, RoadRiskConfig};
pub use lines::{detect_segments, LineSegment, SegmentDetectionOptions};
pub use road::{AmbientMetrics, LongTermRisk, RoadRiskAssessor, RoadRiskFlags, RoadRiskReport, ShortTermRisk};
pub use statistics::Moments;
