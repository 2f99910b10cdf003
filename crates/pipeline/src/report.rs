//! Per-frame output

use serde::{Deserialize, Serialize};
use alerting::FiredAlert;
use perception_types::FusedObject;
use risk_assessment::{RiskResult, RoadRiskReport};

use crate::brake::BrakeCommand;

/// Everything one frame produced, serialisable for display and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub sequence: u32,
    pub timestamp_s: f64,
    /// Wall-clock processing time (milliseconds)
    pub processing_ms: f64,

    /// Detector output count
    pub detections: usize,
    /// Objects with valid depth
    pub fused: usize,
    /// Objects left after the depth-range filter
    pub in_range: usize,
    /// Objects associated with a radar return
    pub radar_fused: usize,

    /// Final objects, with radar and TTC annotations
    pub objects: Vec<FusedObject>,
    /// TTC of the nearest object that has one
    pub nearest_ttc_s: Option<f32>,
    /// `nearest_ttc_s` is at or below the emergency threshold
    pub ttc_alert: bool,
    /// Measured ego speed, or the configured default
    pub ego_speed_mps: f32,

    pub risk: RiskResult,
    pub road: RoadRiskReport,
    pub brake: BrakeCommand,
    /// Alerts that passed their cooldown this frame
    pub alerts: Vec<FiredAlert>,
}
