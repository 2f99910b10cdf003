//! Collision risk from the nearest obstacle

use serde::{Deserialize, Serialize};
use tracing::debug;
use perception_types::{FusedObject, Point3};

use crate::config::RiskConfig;

/// Risk level, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Warning => "warning",
            RiskLevel::Danger => "danger",
        }
    }

    /// Brake intensity requested at this level; `None` releases the brake
    pub fn brake_intensity(&self) -> Option<f32> {
        match self {
            RiskLevel::Danger => Some(1.0),
            RiskLevel::Warning => Some(0.5),
            RiskLevel::Safe => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of the obstacle that drove the assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestObject {
    /// Index into the assessed slice
    pub index: usize,
    pub class_name: String,
    pub depth_m: f32,
    pub position: Point3,
    pub ttc_s: Option<f32>,
}

/// Per-frame collision risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub level: RiskLevel,
    /// Monotone-by-band score in [0, 1]
    pub score: f32,
    pub nearest: Option<NearestObject>,
    pub should_brake: bool,
}

impl RiskResult {
    fn clear() -> Self {
        Self {
            level: RiskLevel::Safe,
            score: 0.0,
            nearest: None,
            should_brake: false,
        }
    }
}

/// Risk of a single object, ignoring the rest of the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectRisk {
    pub level: RiskLevel,
    pub score: f32,
}

/// Maps the nearest obstacle distance to a level, a score and a brake decision
#[derive(Debug, Clone, Default)]
pub struct RiskAssessor {
    config: RiskConfig,
}

impl RiskAssessor {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Assess the scene from its nearest object.
    ///
    /// Ties on depth keep the first object in input order.
    pub fn assess(&self, objects: &[FusedObject]) -> RiskResult {
        let Some((index, nearest)) = objects
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.depth_m.total_cmp(&b.depth_m))
        else {
            return RiskResult::clear();
        };

        let distance = nearest.depth_m;
        let ObjectRisk { level, score } = self.classify(distance);
        let should_brake = distance <= self.config.brake_distance || score >= self.config.risk_threshold;

        debug!(
            level = %level,
            score,
            distance_m = distance,
            class = %nearest.class_name,
            should_brake,
            "Risk assessed"
        );

        RiskResult {
            level,
            score,
            nearest: Some(NearestObject {
                index,
                class_name: nearest.class_name.clone(),
                depth_m: distance,
                position: nearest.position,
                ttc_s: nearest.ttc_s,
            }),
            should_brake,
        }
    }

    /// Same level and score mapping applied to one object
    pub fn assess_object(&self, object: &FusedObject) -> ObjectRisk {
        self.classify(object.depth_m)
    }

    /// Level and score for a distance.
    ///
    /// The score is not continuous at `danger_distance`: it drops from just
    /// under 0.8 in the warning band to 0.5 at the boundary.
    pub fn classify(&self, distance: f32) -> ObjectRisk {
        let RiskConfig {
            safe_distance: safe,
            warning_distance: warning,
            danger_distance: danger,
            ..
        } = self.config;

        let (level, score) = if distance <= danger {
            (RiskLevel::Danger, 1.0 - 0.5 * distance / danger)
        } else if distance <= warning {
            (RiskLevel::Warning, 0.5 + 0.3 * (warning - distance) / (warning - danger))
        } else if distance <= safe {
            (RiskLevel::Warning, 0.2 + 0.3 * (safe - distance) / (safe - warning))
        } else {
            (RiskLevel::Safe, (0.2 - 0.01 * (distance - safe)).max(0.0))
        };

        ObjectRisk {
            level,
            score: score.clamp(0.0, 1.0),
        }
    }
}
