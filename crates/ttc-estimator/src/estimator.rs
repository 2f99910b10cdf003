//! TTC estimator

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use perception_types::FusedObject;

use crate::config::TtcConfig;
use crate::history::{ObjectHistory, TtcSample};
use crate::track::TrackId;

/// Time-to-collision estimator.
///
/// Owns the per-fingerprint histories for the lifetime of a pipeline run.
/// Time is always supplied by the caller.
pub struct TtcEstimator {
    config: TtcConfig,
    histories: HashMap<TrackId, ObjectHistory>,
    /// Last measured ego speed (m/s), 0 when unknown
    ego_speed_mps: f32,
}

impl TtcEstimator {
    pub fn new(config: TtcConfig) -> Self {
        info!(
            history_size = config.history_size,
            min_frames = config.min_frames_for_ttc,
            max_age_s = config.max_history_age_s,
            "Creating TTC estimator"
        );
        Self {
            config,
            histories: HashMap::new(),
            ego_speed_mps: 0.0,
        }
    }

    pub fn config(&self) -> &TtcConfig {
        &self.config
    }

    /// Record a measured ego speed (m/s)
    pub fn update_ego_speed(&mut self, speed_mps: f32) {
        self.ego_speed_mps = speed_mps;
    }

    /// Measured ego speed, or the configured default when none is known.
    ///
    /// Not used by the TTC formula itself, which only sees closing speed.
    pub fn effective_ego_speed(&self) -> f32 {
        if self.ego_speed_mps > 0.0 {
            self.ego_speed_mps
        } else {
            self.config.ego_speed_default_mps
        }
    }

    pub fn fingerprint(&self, obj: &FusedObject) -> TrackId {
        TrackId::of(obj, self.config.bucket_size_px)
    }

    /// Record this frame's objects and attach TTC to each.
    ///
    /// Two objects sharing a fingerprint in one frame land in the same
    /// history; the second sees `dt = 0` and gets no estimate.
    pub fn update(&mut self, objects: Vec<FusedObject>, now_s: f64) -> Vec<FusedObject> {
        let mut refreshed = HashSet::with_capacity(objects.len());
        let mut annotated = Vec::with_capacity(objects.len());

        for mut obj in objects {
            let id = self.fingerprint(&obj);
            let capacity = self.config.history_size;
            let history = self
                .histories
                .entry(id)
                .or_insert_with(|| ObjectHistory::new(capacity));

            if let Some(last) = history.newest() {
                if now_s < last.timestamp_s {
                    warn!(track = %id, now_s, last_s = last.timestamp_s, "Out-of-order timestamp");
                }
            }

            history.push(TtcSample {
                timestamp_s: now_s,
                distance_m: obj.depth_m,
                position: obj.position,
            });

            let ttc = compute_ttc(history, &self.config);
            obj.ttc_s = ttc;
            obj.ttc_valid = ttc.is_some();
            refreshed.insert(id);
            annotated.push(obj);
        }

        self.purge(now_s, &refreshed);
        debug!(
            objects = annotated.len(),
            tracked = self.histories.len(),
            valid = annotated.iter().filter(|o| o.ttc_valid).count(),
            "TTC update"
        );
        annotated
    }

    /// End-of-frame cleanup.
    ///
    /// A fingerprint missing from this frame is dropped once its oldest
    /// sample is older than the max age. A refreshed fingerprint is never
    /// dropped; it only sheds stale samples behind its newest one.
    fn purge(&mut self, now_s: f64, refreshed: &HashSet<TrackId>) {
        let max_age = self.config.max_history_age_s;
        self.histories.retain(|id, history| {
            if refreshed.contains(id) {
                history.purge_stale(now_s, max_age);
                return true;
            }
            let expired = history
                .oldest()
                .map_or(true, |s| now_s - s.timestamp_s > max_age);
            if expired {
                debug!(track = %id, "Dropping stale history");
            }
            !expired
        });
    }

    /// Nearest object (by depth) among those with a valid TTC
    pub fn nearest_valid(objects: &[FusedObject]) -> Option<&FusedObject> {
        objects
            .iter()
            .filter(|o| o.ttc_valid)
            .min_by(|a, b| a.depth_m.total_cmp(&b.depth_m))
    }

    /// True when a TTC is present and at or below `threshold_s`
    pub fn should_alert(ttc_s: Option<f32>, threshold_s: f32) -> bool {
        ttc_s.is_some_and(|ttc| ttc <= threshold_s)
    }

    /// Number of fingerprints currently tracked
    pub fn tracked_count(&self) -> usize {
        self.histories.len()
    }

    pub fn history(&self, id: &TrackId) -> Option<&ObjectHistory> {
        self.histories.get(id)
    }

    /// Drop all state (pipeline restart)
    pub fn reset(&mut self) {
        self.histories.clear();
        self.ego_speed_mps = 0.0;
    }
}

impl Default for TtcEstimator {
    fn default() -> Self {
        Self::new(TtcConfig::default())
    }
}

/// TTC from the oldest and newest of the last `min_frames_for_ttc` samples
fn compute_ttc(history: &ObjectHistory, config: &TtcConfig) -> Option<f32> {
    let window = config.min_frames_for_ttc;
    if history.len() < window {
        return None;
    }

    let mut recent = history.recent(window);
    let first = *recent.next()?;
    let last = recent.last().copied().unwrap_or(first);

    let dt = last.timestamp_s - first.timestamp_s;
    if dt <= 0.0 {
        return None;
    }

    // Positive when the object is getting closer
    let closing_speed = -((last.distance_m - first.distance_m) as f64) / dt;
    if closing_speed <= 0.0 {
        return None;
    }

    let ttc = last.distance_m as f64 / closing_speed;
    if ttc < 0.0 || ttc > config.max_ttc_s as f64 {
        return None;
    }
    Some(ttc as f32)
}
