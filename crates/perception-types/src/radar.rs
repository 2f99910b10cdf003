//! Radar returns

use serde::{Deserialize, Serialize};

/// One range/bearing return from the forward radar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarReturn {
    /// Range to target (meters)
    pub distance_m: f32,

    /// Azimuth (degrees, 0 = straight ahead, positive to the right)
    pub bearing_deg: f32,

    /// Elevation (degrees)
    #[serde(default)]
    pub elevation_deg: Option<f32>,

    /// Radial velocity (m/s)
    #[serde(default)]
    pub radial_velocity_mps: Option<f32>,
}

impl RadarReturn {
    pub fn new(distance_m: f32, bearing_deg: f32) -> Self {
        Self {
            distance_m: distance_m.max(0.0),
            bearing_deg,
            elevation_deg: None,
            radial_velocity_mps: None,
        }
    }

    pub fn with_velocity(mut self, radial_velocity_mps: f32) -> Self {
        self.radial_velocity_mps = Some(radial_velocity_mps);
        self
    }

    /// Position on the camera's ground plane as (x, z): x right, z forward
    pub fn ground_position(&self) -> (f32, f32) {
        let bearing = (self.bearing_deg as f64).to_radians();
        let distance = self.distance_m as f64;
        ((distance * bearing.sin()) as f32, (distance * bearing.cos()) as f32)
    }
}
