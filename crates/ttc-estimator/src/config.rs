//! TTC configuration

use serde::{Deserialize, Serialize};
use perception_types::{ensure_positive, ensure_range, ConfigError};

/// TTC estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtcConfig {
    /// Ego speed assumed when no measurement is available (m/s, ~18 km/h)
    pub ego_speed_default_mps: f32,

    /// Samples kept per fingerprint
    pub history_size: usize,

    /// Samples spanned by one TTC estimate
    pub min_frames_for_ttc: usize,

    /// TTC at or below which a collision alert is raised (seconds)
    pub emergency_threshold_s: f32,

    /// Histories whose samples are all older than this are forgotten (seconds)
    pub max_history_age_s: f64,

    /// Larger TTC values are treated as noise (seconds)
    pub max_ttc_s: f32,

    /// Box-centre bucket size for fingerprints (pixels)
    pub bucket_size_px: f32,
}

impl Default for TtcConfig {
    fn default() -> Self {
        Self {
            ego_speed_default_mps: 5.0,
            history_size: 10,
            min_frames_for_ttc: 2,
            emergency_threshold_s: 3.0,
            max_history_age_s: 2.0,
            max_ttc_s: 100.0,
            bucket_size_px: 50.0,
        }
    }
}

impl TtcConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range("ttc.min_frames_for_ttc", self.min_frames_for_ttc as f64, 2.0, f64::MAX)?;
        ensure_range(
            "ttc.history_size",
            self.history_size as f64,
            self.min_frames_for_ttc as f64,
            f64::MAX,
        )?;
        ensure_range("ttc.ego_speed_default", self.ego_speed_default_mps as f64, 0.0, f64::MAX)?;
        ensure_positive("ttc.emergency_threshold", self.emergency_threshold_s as f64)?;
        ensure_positive("ttc.max_history_age", self.max_history_age_s)?;
        ensure_positive("ttc.max_ttc", self.max_ttc_s as f64)?;
        ensure_positive("ttc.bucket_size", self.bucket_size_px as f64)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(TtcConfig::default().validate().is_ok());
    }

    #[test]
    fn test_history_must_cover_min_frames() {
        let config = TtcConfig {
            history_size: 3,
            min_frames_for_ttc: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TtcConfig {
            min_frames_for_ttc: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
