//! Alert kinds

use serde::{Deserialize, Serialize};

/// Everything the coordinator can announce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowVisibility,
    WetRoad,
    Curve,
    NarrowRoad,
    TtcWarning,
    ObstacleDanger,
    ObstacleWarning,
}

impl AlertKind {
    pub const ALL: [AlertKind; 7] = [
        AlertKind::LowVisibility,
        AlertKind::WetRoad,
        AlertKind::Curve,
        AlertKind::NarrowRoad,
        AlertKind::TtcWarning,
        AlertKind::ObstacleDanger,
        AlertKind::ObstacleWarning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowVisibility => "low_visibility",
            AlertKind::WetRoad => "wet_road",
            AlertKind::Curve => "curve",
            AlertKind::NarrowRoad => "narrow_road",
            AlertKind::TtcWarning => "ttc_warning",
            AlertKind::ObstacleDanger => "obstacle_danger",
            AlertKind::ObstacleWarning => "obstacle_warning",
        }
    }

    /// Default spoken message
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::LowVisibility => "Low light, drive carefully",
            AlertKind::WetRoad => "Slippery road, slow down",
            AlertKind::Curve => "Curve ahead, reduce speed",
            AlertKind::NarrowRoad => "Narrow road ahead, take care",
            AlertKind::TtcWarning => "Caution! Collision risk ahead!",
            AlertKind::ObstacleDanger => "Danger! Obstacle ahead!",
            AlertKind::ObstacleWarning => "Warning! Obstacle ahead",
        }
    }

    /// Spoken message with the time to collision appended when known
    pub fn announcement(&self, ttc_s: Option<f32>) -> String {
        match (self, ttc_s) {
            (AlertKind::TtcWarning, Some(ttc)) => {
                format!("{}, estimated collision in {:.1} seconds", self.message(), ttc)
            }
            _ => self.message().to_string(),
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique() {
        let mut names: Vec<_> = AlertKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AlertKind::ALL.len());
    }

    #[test]
    fn test_ttc_announcement() {
        assert_eq!(
            AlertKind::TtcWarning.announcement(Some(2.34)),
            "Caution! Collision risk ahead!, estimated collision in 2.3 seconds"
        );
        assert_eq!(AlertKind::TtcWarning.announcement(None), "Caution! Collision risk ahead!");
        assert_eq!(AlertKind::Curve.announcement(Some(1.0)), "Curve ahead, reduce speed");
    }
}
