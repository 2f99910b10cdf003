//! Risk thresholds

use serde::{Deserialize, Serialize};
use perception_types::{ensure_increasing, ensure_positive, ensure_range, ConfigError};

/// Collision risk configuration (distances in meters)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Beyond this distance the scene is safe
    pub safe_distance: f32,

    /// Upper edge of the close warning band
    pub warning_distance: f32,

    /// At or below this distance the scene is dangerous
    pub danger_distance: f32,

    /// Brake unconditionally at or below this distance
    pub brake_distance: f32,

    /// Brake when the risk score reaches this value (0-1)
    pub risk_threshold: f32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            safe_distance: 5.0,
            warning_distance: 3.0,
            danger_distance: 1.5,
            brake_distance: 1.0,
            risk_threshold: 0.7,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("danger_distance", self.danger_distance as f64)?;
        ensure_increasing(
            "danger_distance",
            self.danger_distance as f64,
            "warning_distance",
            self.warning_distance as f64,
        )?;
        ensure_increasing(
            "warning_distance",
            self.warning_distance as f64,
            "safe_distance",
            self.safe_distance as f64,
        )?;
        ensure_positive("brake_distance", self.brake_distance as f64)?;
        ensure_range("risk_threshold", self.risk_threshold as f64, 0.0, 1.0)?;
        Ok(())
    }
}

/// Road-condition risk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadRiskConfig {
    /// Mean intensity below which visibility is low (0-255)
    pub brightness_threshold: f64,

    /// Intensity standard deviation below which visibility is low
    pub contrast_threshold: f64,

    /// Normalised gradient texture below which the road reads as wet
    pub texture_threshold: f64,

    /// Curve when segment-angle variance exceeds this x 100 (deg^2)
    pub curvature_threshold: f64,

    /// Box-area density above which the road is narrow
    pub narrow_road_threshold: f64,

    /// Fixed image area the density is normalised by (pixels).
    /// Not the live frame size.
    pub reference_width: u32,
    pub reference_height: u32,

    /// Canny hysteresis thresholds for lane edges
    pub canny_low: f32,
    pub canny_high: f32,

    /// Hough votes needed for a line
    pub hough_vote_threshold: u32,

    /// Shortest accepted segment (pixels)
    pub min_line_length: f32,

    /// Largest gap bridged inside a segment (pixels)
    pub max_line_gap: f32,
}

impl Default for RoadRiskConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 80.0,
            contrast_threshold: 30.0,
            texture_threshold: 0.3,
            curvature_threshold: 0.1,
            narrow_road_threshold: 0.4,
            reference_width: 640,
            reference_height: 480,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 50,
            min_line_length: 30.0,
            max_line_gap: 10.0,
        }
    }
}

impl RoadRiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range("brightness_threshold", self.brightness_threshold, 0.0, 255.0)?;
        ensure_range("contrast_threshold", self.contrast_threshold, 0.0, 255.0)?;
        ensure_range("texture_threshold", self.texture_threshold, 0.0, f64::MAX)?;
        ensure_range("curvature_threshold", self.curvature_threshold, 0.0, f64::MAX)?;
        ensure_range("narrow_road_threshold", self.narrow_road_threshold, 0.0, f64::MAX)?;
        ensure_positive("reference_width", self.reference_width as f64)?;
        ensure_positive("reference_height", self.reference_height as f64)?;
        ensure_increasing("canny_low", self.canny_low as f64, "canny_high", self.canny_high as f64)?;
        ensure_positive("hough_vote_threshold", self.hough_vote_threshold as f64)?;
        ensure_positive("min_line_length", self.min_line_length as f64)?;
        ensure_range("max_line_gap", self.max_line_gap as f64, 0.0, f64::MAX)?;
        Ok(())
    }

    pub fn reference_area(&self) -> f64 {
        self.reference_width as f64 * self.reference_height as f64
    }
}
