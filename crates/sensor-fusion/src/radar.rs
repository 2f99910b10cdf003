//! Vision / radar association
//!
//! Greedy nearest-neighbour matching in the ground (x, z) plane. Each vision
//! object picks its closest radar return independently; there is no
//! exclusivity, so one return can be claimed by several objects (e.g. two
//! boxes on the same vehicle). Radar range replaces stereo depth on a match.

use serde::{Deserialize, Serialize};
use tracing::debug;
use perception_types::{ensure_positive, ConfigError, FusedObject, RadarReturn};

/// Radar association configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Maximum ground-plane gap for a vision object to claim a return (meters)
    pub max_association_distance_m: f32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            max_association_distance_m: 1.0,
        }
    }
}

impl RadarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("max_association_distance", self.max_association_distance_m as f64)
    }
}

/// Associates vision objects with radar returns
pub struct RadarAssociator {
    config: RadarConfig,
}

impl RadarAssociator {
    pub fn new(config: RadarConfig) -> Self {
        Self { config }
    }

    /// Associate every object with its nearest radar return, if within range.
    ///
    /// With no radar returns the objects are returned untouched.
    pub fn associate(&self, objects: Vec<FusedObject>, returns: &[RadarReturn]) -> Vec<FusedObject> {
        if returns.is_empty() {
            return objects;
        }

        let ground: Vec<(f32, f32)> = returns.iter().map(RadarReturn::ground_position).collect();
        let mut matched = 0u64;

        let fused = objects
            .into_iter()
            .map(|mut obj| {
                obj.radar_fused = false;
                if let Some(radar) = self.nearest(&obj, returns, &ground) {
                    obj.radar_fused = true;
                    obj.radar_distance_m = Some(radar.distance_m);
                    obj.radar_velocity_mps = radar.radial_velocity_mps;
                    obj.depth_m = radar.distance_m;
                    matched += 1;
                }
                obj
            })
            .collect();

        debug!(matched, radar_returns = returns.len(), "Radar association complete");
        metrics::counter!("fusion_radar_associations_total").increment(matched);
        fused
    }

    /// First return with the smallest ground distance strictly below the bound
    fn nearest<'a>(
        &self,
        obj: &FusedObject,
        returns: &'a [RadarReturn],
        ground: &[(f32, f32)],
    ) -> Option<&'a RadarReturn> {
        let mut best: Option<(f32, &RadarReturn)> = None;
        for (radar, &(x, z)) in returns.iter().zip(ground) {
            let gap = obj.position.ground_distance(x, z);
            let closer = best.map_or(true, |(best_gap, _)| gap < best_gap);
            if closer && gap < self.config.max_association_distance_m {
                best = Some((gap, radar));
            }
        }
        best.map(|(_, radar)| radar)
    }
}

impl Default for RadarAssociator {
    fn default() -> Self {
        Self::new(RadarConfig::default())
    }
}
